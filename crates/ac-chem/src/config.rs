//! Chemistry configuration (YAML).

use crate::error::{ChemError, ChemResult};
use crate::params::{DEFAULT_METALLICITY_BOUNDS, ParamScale};
use crate::solver_io::SolverParameters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LOGK_WITHOUT_IONS: &str = "logK_wo_ions.dat";
pub const LOGK_WITH_IONS: &str = "logK.dat";
pub const LOGK_EXTENDED: &str = "logK_extended.dat";

/// Which bundled equilibrium-constant dataset to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKDataset {
    WithoutIons,
    WithIons,
    Extended,
}

impl LogKDataset {
    /// The extended set wins over the ion flag; it already carries ions.
    pub fn choose(with_ions: bool, extended: bool) -> Self {
        if extended {
            Self::Extended
        } else if with_ions {
            Self::WithIons
        } else {
            Self::WithoutIons
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::WithoutIons => LOGK_WITHOUT_IONS,
            Self::WithIons => LOGK_WITH_IONS,
            Self::Extended => LOGK_EXTENDED,
        }
    }
}

/// Everything needed to build an equilibrium chemistry instance.
///
/// Field defaults follow the plugin defaults: solar elements, metallicity 1,
/// He/H from the baseline table, no ions, standard accuracy and iteration caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemistryConfig {
    /// He/H override; `None` keeps the baseline value.
    pub h_he_ratio: Option<f64>,
    /// Restrict the solver to these elements.
    pub selected_elements: Option<Vec<String>>,
    /// User `<symbol> <log abundance>` file replacing the solar table.
    pub elements_abundance_file: Option<PathBuf>,
    pub ratio_elements: Option<Vec<String>>,
    pub ratios_to_o: Option<Vec<f64>>,
    pub metallicity: f64,
    pub metallicity_bounds: (f64, f64),
    pub metallicity_scale: ParamScale,
    /// Explicit equilibrium-constant dataset; overrides `with_ions`/`extended_logk`.
    pub species_datafile: Option<PathBuf>,
    /// Directory holding the bundled logK datasets.
    pub data_dir: PathBuf,
    pub with_ions: bool,
    pub extended_logk: bool,
    #[serde(flatten)]
    pub solver: SolverParameters,
}

impl Default for ChemistryConfig {
    fn default() -> Self {
        Self {
            h_he_ratio: None,
            selected_elements: None,
            elements_abundance_file: None,
            ratio_elements: None,
            ratios_to_o: None,
            metallicity: 1.0,
            metallicity_bounds: DEFAULT_METALLICITY_BOUNDS,
            metallicity_scale: ParamScale::Linear,
            species_datafile: None,
            data_dir: PathBuf::from("data"),
            with_ions: false,
            extended_logk: false,
            solver: SolverParameters::default(),
        }
    }
}

impl ChemistryConfig {
    pub fn with_selected_elements<S: AsRef<str>>(mut self, elements: &[S]) -> Self {
        self.selected_elements = Some(elements.iter().map(|e| e.as_ref().to_string()).collect());
        self
    }

    pub fn with_ratios<S: AsRef<str>>(mut self, elements: &[S], ratios_to_o: &[f64]) -> Self {
        self.ratio_elements = Some(elements.iter().map(|e| e.as_ref().to_string()).collect());
        self.ratios_to_o = Some(ratios_to_o.to_vec());
        self
    }

    pub fn with_metallicity(mut self, metallicity: f64) -> Self {
        self.metallicity = metallicity;
        self
    }

    pub fn with_species_datafile(mut self, path: impl Into<PathBuf>) -> Self {
        self.species_datafile = Some(path.into());
        self
    }

    pub fn logk_dataset(&self) -> LogKDataset {
        LogKDataset::choose(self.with_ions, self.extended_logk)
    }

    /// The equilibrium-constant file the backend will load.
    pub fn resolve_species_datafile(&self) -> PathBuf {
        match &self.species_datafile {
            Some(path) => path.clone(),
            None => self.data_dir.join(self.logk_dataset().file_name()),
        }
    }

    /// Reject values the chemistry cannot start from. Files are checked at construction.
    pub fn validate(&self) -> ChemResult<()> {
        if !self.metallicity.is_finite() || self.metallicity <= 0.0 {
            return Err(ChemError::Config {
                what: format!("metallicity must be positive, got {}", self.metallicity),
            });
        }
        if let Some(ratio) = self.h_he_ratio {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(ChemError::Config {
                    what: format!("h_he_ratio must be positive, got {ratio}"),
                });
            }
        }
        let (lo, hi) = self.metallicity_bounds;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(ChemError::Config {
                what: format!("metallicity bounds [{lo}, {hi}] are not an interval"),
            });
        }
        if self.metallicity_scale == ParamScale::Log && lo <= 0.0 {
            return Err(ChemError::Config {
                what: "log-scaled metallicity needs a positive lower bound".to_string(),
            });
        }
        match (&self.ratio_elements, &self.ratios_to_o) {
            (Some(names), Some(values)) if names.len() != values.len() => {
                return Err(ChemError::LengthMismatch {
                    what: "ratio_elements and ratios_to_o",
                    left: names.len(),
                    right: values.len(),
                });
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ChemError::Config {
                    what: "ratio_elements and ratios_to_o must be given together".to_string(),
                });
            }
            _ => {}
        }
        if let Some(bad) = self
            .ratios_to_o
            .iter()
            .flatten()
            .find(|r| !r.is_finite() || **r <= 0.0)
        {
            return Err(ChemError::Config {
                what: format!("ratios to oxygen must be positive, got {bad}"),
            });
        }
        Ok(())
    }
}

/// Read and validate a YAML chemistry configuration.
pub fn load_config(path: &Path) -> ChemResult<ChemistryConfig> {
    if !path.exists() {
        return Err(ChemError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let config: ChemistryConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &ChemistryConfig) -> ChemResult<()> {
    config.validate()?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
