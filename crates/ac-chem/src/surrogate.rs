//! Frozen-speciation backend for demos and tests.
//!
//! This is NOT an equilibrium solver. It assigns every element to one fixed
//! carrier species, hydrogen-rich limit:
//!
//! - O, C, N, S, P form their saturated hydrides (H2O, CH4, NH3, H2S, PH3)
//! - leftover H forms H2
//! - every other element stays atomic
//!
//! The carrier amounts only depend on the element abundances, so mixing ratios
//! are constant with height while number densities follow the ideal gas law.
//! That is enough to exercise the adapter end to end without the native engine.

use crate::abundance_file::parse_abundance_text;
use crate::backend::{EquilibriumBackend, EquilibriumSession};
use crate::elements::{FREE_ELECTRON, atomic_weight};
use crate::error::{ChemError, ChemResult};
use crate::solver_io::{SolverInput, SolverOutput, SolverParameters, SolverStatus};
use ac_core::constants::K_BOLTZMANN_CGS;
use ac_core::log_abundance_to_linear;
use std::path::Path;
use tracing::debug;

/// bar -> dyn/cm².
const BAR_TO_BARYE: f64 = 1e6;

/// (element, hydrogen atoms, backend label) for every hydride carrier.
const HYDRIDES: [(&str, u32, &str); 5] = [
    ("O", 2, "H2O1"),
    ("C", 4, "C1H4"),
    ("N", 3, "H3N1"),
    ("S", 2, "H2S1"),
    ("P", 3, "H3P1"),
];

/// Backend producing [`FrozenSpeciationSession`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrozenSpeciationBackend;

impl FrozenSpeciationBackend {
    pub fn new() -> Self {
        Self
    }
}

impl EquilibriumBackend for FrozenSpeciationBackend {
    type Session = FrozenSpeciationSession;

    fn name(&self) -> &str {
        "frozen-speciation"
    }

    fn construct(
        &self,
        abundance_file: &Path,
        species_datafile: &Path,
        verbosity: u32,
    ) -> ChemResult<FrozenSpeciationSession> {
        if !species_datafile.exists() {
            return Err(ChemError::MissingFile {
                path: species_datafile.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(abundance_file)?;
        let (elements, logs) = parse_abundance_text(&text, abundance_file)?;
        let abundances = logs.into_iter().map(log_abundance_to_linear).collect();
        if verbosity > 0 {
            debug!(elements = ?elements, "frozen speciation session");
        }
        FrozenSpeciationSession::new(elements, abundances)
    }
}

#[derive(Debug, Clone)]
struct Carrier {
    label: String,
    /// (element index, atoms per molecule)
    atoms: Vec<(usize, u32)>,
    molar_mass: f64,
}

/// Session with a fixed carrier per element.
#[derive(Debug, Clone)]
pub struct FrozenSpeciationSession {
    elements: Vec<String>,
    abundances: Vec<f64>,
    carriers: Vec<Carrier>,
    params: SolverParameters,
}

impl FrozenSpeciationSession {
    pub fn new(elements: Vec<String>, abundances: Vec<f64>) -> ChemResult<Self> {
        if elements.len() != abundances.len() {
            return Err(ChemError::LengthMismatch {
                what: "elements and abundances",
                left: elements.len(),
                right: abundances.len(),
            });
        }

        let weight = |symbol: &str| {
            atomic_weight(symbol).ok_or_else(|| ChemError::Backend {
                message: format!("no atomic weight for element '{symbol}'"),
            })
        };
        let hydrogen = elements.iter().position(|e| e == "H");

        let mut carriers = Vec::new();
        if let Some(h) = hydrogen {
            carriers.push(Carrier {
                label: "H2".to_string(),
                atoms: vec![(h, 2)],
                molar_mass: 2.0 * weight("H")?,
            });
        }
        for (index, symbol) in elements.iter().enumerate() {
            if symbol == "H" || symbol == FREE_ELECTRON {
                continue;
            }
            let hydride = HYDRIDES.iter().find(|(element, _, _)| *element == symbol.as_str());
            let carrier = match (hydride, hydrogen) {
                (Some((_, n_h, label)), Some(h)) => Carrier {
                    label: label.to_string(),
                    atoms: vec![(index, 1), (h, *n_h)],
                    molar_mass: weight(symbol)? + f64::from(*n_h) * weight("H")?,
                },
                _ => Carrier {
                    label: symbol.clone(),
                    atoms: vec![(index, 1)],
                    molar_mass: weight(symbol)?,
                },
            };
            carriers.push(carrier);
        }

        Ok(Self {
            elements,
            abundances,
            carriers,
            params: SolverParameters::default(),
        })
    }

    pub fn parameters(&self) -> &SolverParameters {
        &self.params
    }

    /// Relative molecule amounts per carrier (not normalized).
    fn carrier_amounts(&self) -> Vec<f64> {
        let hydrogen = self.elements.iter().position(|e| e == "H");

        // H bound in hydrides, scaled down if the gas is hydrogen-poor.
        let bound_h: f64 = self
            .carriers
            .iter()
            .filter(|c| c.atoms.len() == 2)
            .map(|c| f64::from(c.atoms[1].1) * self.abundances[c.atoms[0].0])
            .sum();
        let available_h = hydrogen.map_or(0.0, |h| self.abundances[h]);
        let hydride_scale = if bound_h > available_h && bound_h > 0.0 {
            available_h / bound_h
        } else {
            1.0
        };

        self.carriers
            .iter()
            .map(|c| match c.atoms.as_slice() {
                [(h, 2)] if Some(*h) == hydrogen => {
                    ((available_h - bound_h * hydride_scale) / 2.0).max(0.0)
                }
                [(element, 1), _] => self.abundances[*element] * hydride_scale,
                [(element, _)] => self.abundances[*element],
                _ => 0.0,
            })
            .collect()
    }
}

impl EquilibriumSession for FrozenSpeciationSession {
    fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn element_symbol(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(String::as_str)
    }

    fn element_abundance(&self, index: usize) -> Option<f64> {
        self.abundances.get(index).copied()
    }

    fn gas_species_count(&self) -> usize {
        self.carriers.len()
    }

    fn gas_species_symbol(&self, index: usize) -> Option<&str> {
        self.carriers.get(index).map(|c| c.label.as_str())
    }

    fn set_element_abundances(&mut self, abundances: &[f64]) -> ChemResult<()> {
        if abundances.len() != self.elements.len() {
            return Err(ChemError::LengthMismatch {
                what: "element abundances",
                left: abundances.len(),
                right: self.elements.len(),
            });
        }
        self.abundances.copy_from_slice(abundances);
        Ok(())
    }

    fn configure(&mut self, params: &SolverParameters) {
        self.params = *params;
    }

    fn calc_densities(
        &mut self,
        input: &SolverInput,
        output: &mut SolverOutput,
    ) -> ChemResult<SolverStatus> {
        if input.temperature.len() != input.pressure.len() {
            return Err(ChemError::Backend {
                message: format!(
                    "temperature has {} layers but pressure has {}",
                    input.temperature.len(),
                    input.pressure.len()
                ),
            });
        }

        let amounts = self.carrier_amounts();
        let total: f64 = amounts.iter().sum();
        if total <= 0.0 {
            return Err(ChemError::Backend {
                message: "no gas left to distribute".to_string(),
            });
        }
        let fractions: Vec<f64> = amounts.iter().map(|a| a / total).collect();
        let mean_molecular_weight: f64 = fractions
            .iter()
            .zip(&self.carriers)
            .map(|(x, c)| x * c.molar_mass)
            .sum();
        let atoms_per_molecule: f64 = fractions
            .iter()
            .zip(&self.carriers)
            .map(|(x, c)| x * c.atoms.iter().map(|(_, n)| f64::from(*n)).sum::<f64>())
            .sum();

        let layers = input.layers();
        let mut flags = Vec::with_capacity(layers);
        let mut densities = Vec::with_capacity(layers);
        let mut element_density = Vec::with_capacity(layers);
        for (t, p) in input.temperature.iter().zip(&input.pressure) {
            let valid = t.is_finite() && p.is_finite() && *t > 0.0 && *p > 0.0;
            let n_total = if valid {
                p * BAR_TO_BARYE / (K_BOLTZMANN_CGS * t)
            } else {
                0.0
            };
            flags.push(if valid {
                SolverStatus::Success.code()
            } else {
                SolverStatus::WrongInputValues.code()
            });
            densities.push(fractions.iter().map(|x| x * n_total).collect());
            element_density.push(n_total * atoms_per_molecule);
        }

        let status = if flags.iter().all(|f| *f == 0) {
            SolverStatus::Success
        } else {
            SolverStatus::WrongInputValues
        };

        *output = SolverOutput {
            number_densities: densities,
            total_element_density: element_density,
            mean_molecular_weight: vec![mean_molecular_weight; layers],
            element_conserved: vec![vec![1; self.elements.len()]; layers],
            nb_chemistry_iterations: vec![1; layers],
            nb_cond_iterations: vec![0; layers],
            nb_iterations: vec![1; layers],
            status_flags: flags,
            ..Default::default()
        };
        Ok(status)
    }
}
