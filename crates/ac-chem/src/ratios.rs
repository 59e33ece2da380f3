//! Abundance state expressed as metallicity, He/H and element-to-oxygen ratios.
//!
//! The backend wants an absolute abundance per element. Retrievals fit ratios
//! instead, so the absolute vector is rebuilt from the ratio state before every
//! evaluation:
//!
//! ```text
//! H  = 1
//! He = h_he_ratio
//! O  = O_baseline * metallicity
//! X  = ratio[X] * O            (every other element)
//! ```

use crate::backend::EquilibriumSession;
use crate::elements::FREE_ELECTRON;
use crate::error::{ChemError, ChemResult};
use ac_core::ensure_positive;

/// Elements that never get a ratio-to-oxygen entry.
pub const NON_RATIO_ELEMENTS: [&str; 4] = ["H", "He", "O", FREE_ELECTRON];

/// Ordered element -> ratio-to-oxygen mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatioSet {
    entries: Vec<(String, f64)>,
}

impl RatioSet {
    pub fn get(&self, element: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(e, _)| e == element)
            .map(|(_, r)| *r)
    }

    /// Overwrite the ratio of an existing element. Returns false if `element` has no entry.
    pub fn set(&mut self, element: &str, ratio: f64) -> bool {
        match self.entries.iter_mut().find(|(e, _)| e == element) {
            Some(entry) => {
                entry.1 = ratio;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, element: &str) -> bool {
        self.get(element).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(e, _)| e.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(e, r)| (e.as_str(), *r))
    }

    fn push(&mut self, element: &str, ratio: f64) {
        self.entries.push((element.to_string(), ratio));
    }
}

/// Explicit ratio overrides, as supplied by configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioOverrides<'a> {
    pub elements: Option<&'a [String]>,
    pub ratios_to_o: Option<&'a [f64]>,
}

/// Mutable abundance state for one session.
#[derive(Debug, Clone)]
pub struct AbundanceState {
    elements: Vec<String>,
    baseline: Vec<f64>,
    baseline_o: f64,
    metallicity: f64,
    h_he_ratio: f64,
    ratios: RatioSet,
}

impl AbundanceState {
    /// Seed ratios from the baseline (`baseline[X] / baseline[O]`) and apply overrides.
    ///
    /// `elements` and `baseline` are the session's element order and linear
    /// abundances. When `h_he_ratio` is `None` the baseline He abundance is used.
    pub fn new(
        elements: &[String],
        baseline: &[f64],
        h_he_ratio: Option<f64>,
        metallicity: f64,
        overrides: RatioOverrides<'_>,
    ) -> ChemResult<Self> {
        if elements.len() != baseline.len() {
            return Err(ChemError::LengthMismatch {
                what: "session elements and baseline abundances",
                left: elements.len(),
                right: baseline.len(),
            });
        }

        let lookup = |symbol: &str| {
            elements
                .iter()
                .position(|e| e == symbol)
                .map(|i| baseline[i])
        };

        let baseline_o = lookup("O").ok_or_else(|| ChemError::Config {
            what: "ratio parameterization requires oxygen in the element selection".to_string(),
        })?;
        ensure_positive(baseline_o, "baseline oxygen abundance")?;
        ensure_positive(metallicity, "metallicity")?;

        let h_he_ratio = match h_he_ratio {
            Some(ratio) => ensure_positive(ratio, "h_he_ratio")?,
            None => lookup("He").unwrap_or(0.0),
        };

        let mut ratios = RatioSet::default();
        for (symbol, abundance) in elements.iter().zip(baseline) {
            if NON_RATIO_ELEMENTS.contains(&symbol.as_str()) {
                continue;
            }
            ratios.push(symbol, abundance / baseline_o);
        }

        match (overrides.elements, overrides.ratios_to_o) {
            (None, None) => {}
            (Some(names), Some(values)) => {
                if names.len() != values.len() {
                    return Err(ChemError::LengthMismatch {
                        what: "ratio_elements and ratios_to_o",
                        left: names.len(),
                        right: values.len(),
                    });
                }
                for (name, value) in names.iter().zip(values) {
                    ensure_positive(*value, "ratio to oxygen")?;
                    if !ratios.set(name, *value) {
                        return Err(ChemError::Config {
                            what: format!("ratio element '{name}' is not a ratio element of this session"),
                        });
                    }
                }
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ChemError::Config {
                    what: "ratio_elements and ratios_to_o must be given together".to_string(),
                });
            }
        }

        Ok(Self {
            elements: elements.to_vec(),
            baseline: baseline.to_vec(),
            baseline_o,
            metallicity,
            h_he_ratio,
            ratios,
        })
    }

    pub fn metallicity(&self) -> f64 {
        self.metallicity
    }

    pub fn set_metallicity(&mut self, value: f64) -> ChemResult<()> {
        self.metallicity = ensure_positive(value, "metallicity")?;
        Ok(())
    }

    pub fn h_he_ratio(&self) -> f64 {
        self.h_he_ratio
    }

    pub fn set_h_he_ratio(&mut self, value: f64) -> ChemResult<()> {
        self.h_he_ratio = ensure_positive(value, "h_he_ratio")?;
        Ok(())
    }

    pub fn ratio(&self, element: &str) -> Option<f64> {
        self.ratios.get(element)
    }

    /// Set one element's ratio to oxygen; other entries are untouched.
    pub fn set_ratio(&mut self, element: &str, value: f64) -> ChemResult<()> {
        ensure_positive(value, "ratio to oxygen")?;
        if self.ratios.set(element, value) {
            Ok(())
        } else {
            Err(ChemError::InvalidArg {
                what: format!("'{element}' has no ratio to oxygen"),
            })
        }
    }

    pub fn ratios(&self) -> &RatioSet {
        &self.ratios
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Absolute abundances in session element order, derived from the current state.
    pub fn absolute_abundances(&self) -> Vec<f64> {
        let oxygen = self.baseline_o * self.metallicity;
        self.elements
            .iter()
            .zip(&self.baseline)
            .map(|(symbol, baseline)| match symbol.as_str() {
                "H" => 1.0,
                "He" => self.h_he_ratio,
                "O" => oxygen,
                // Charge bookkeeping only; keep its baseline proportion to oxygen.
                FREE_ELECTRON => baseline / self.baseline_o * oxygen,
                other => self.ratios.get(other).unwrap_or(baseline / self.baseline_o) * oxygen,
            })
            .collect()
    }

    /// Push the current absolute abundances into `session`. Returns the vector pushed.
    pub fn reconcile<S: EquilibriumSession + ?Sized>(&self, session: &mut S) -> ChemResult<Vec<f64>> {
        let abundances = self.absolute_abundances();
        session.set_element_abundances(&abundances)?;
        Ok(abundances)
    }
}
