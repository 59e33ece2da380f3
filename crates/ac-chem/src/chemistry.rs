//! Equilibrium chemistry: the object a retrieval host talks to.
//!
//! Owns one backend session plus the ratio state and fitting parameters built
//! on top of it. Each [`initialize_chemistry`](EquilibriumChemistry::initialize_chemistry)
//! call pushes the current abundances, solves every layer and caches the
//! mixing-ratio and mean-molecular-weight profiles.

use crate::backend::{EquilibriumBackend, EquilibriumSession};
use crate::catalog::reconcile_species;
use crate::config::ChemistryConfig;
use crate::error::{ChemError, ChemResult};
use crate::params::{FitParam, FitParamRegistry};
use crate::ratios::{AbundanceState, RatioOverrides};
use crate::session::{SolverSession, create_session};
use crate::solver_io::{SolverInput, SolverOutput, SolverStatus};
use ac_core::{molar_mass_to_kg, number_density_cgs, pa, to_bar};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, warn};

/// Keywords a host may use to select this chemistry.
pub const INPUT_KEYWORDS: [&str; 2] = ["fastchem", "fastchem3"];

pub const CITATION: &str = r#"@article{fastchem,
    author = {Stock, Joachim W and Kitzmann, Daniel and Patzer, A Beate C and Sedlmayr, Erwin},
    title = "{FastChem: A computer program for efficient complex chemical equilibrium calculations in the neutral/ionized gas phase with applications to stellar and planetary atmospheres}",
    journal = {Monthly Notices of the Royal Astronomical Society},
    volume = {479},
    number = {1},
    pages = {865-874},
    year = {2018},
    month = {06},
    issn = {0035-8711},
    doi = {10.1093/mnras/sty1531},
    url = {https://doi.org/10.1093/mnras/sty1531},
}"#;

/// Equilibrium chemistry bound to one backend session.
#[derive(Debug)]
pub struct EquilibriumChemistry<S> {
    session: SolverSession<S>,
    state: AbundanceState,
    params: FitParamRegistry,
    gases: Vec<String>,
    mix_profile: Option<DMatrix<f64>>,
    mu_profile: Option<DVector<f64>>,
    last_output: Option<SolverOutput>,
    last_status: Option<SolverStatus>,
    last_abundances: Vec<f64>,
}

impl<S: EquilibriumSession> EquilibriumChemistry<S> {
    /// Build the session, ratio state and parameter registry from `config`.
    ///
    /// Backend species are renamed onto `canonical_species` by elemental
    /// composition. Nothing is kept if any step fails.
    pub fn new<B, C>(backend: &B, config: &ChemistryConfig, canonical_species: &[C]) -> ChemResult<Self>
    where
        B: EquilibriumBackend<Session = S>,
        C: AsRef<str>,
    {
        config.validate()?;
        let datafile = config.resolve_species_datafile();

        let mut session = create_session(
            backend,
            &datafile,
            config.selected_elements.as_deref(),
            config.elements_abundance_file.as_deref(),
        )?;
        session.handle_mut().configure(&config.solver);

        let state = AbundanceState::new(
            session.elements(),
            session.baseline(),
            config.h_he_ratio,
            config.metallicity,
            RatioOverrides {
                elements: config.ratio_elements.as_deref(),
                ratios_to_o: config.ratios_to_o.as_deref(),
            },
        )?;
        let params =
            FitParamRegistry::for_state(&state, config.metallicity_bounds, config.metallicity_scale)?;
        let gases = reconcile_species(canonical_species, &session.handle().gas_species());

        info!(
            elements = session.element_count(),
            species = gases.len(),
            parameters = params.len(),
            "equilibrium chemistry ready"
        );
        debug!(gases = ?gases, "reconciled species");

        Ok(Self {
            session,
            state,
            params,
            gases,
            mix_profile: None,
            mu_profile: None,
            last_output: None,
            last_status: None,
            last_abundances: Vec::new(),
        })
    }

    pub fn input_keywords() -> &'static [&'static str] {
        &INPUT_KEYWORDS
    }

    /// Species names in backend order, renamed to canonical names where possible.
    pub fn gases(&self) -> &[String] {
        &self.gases
    }

    /// Mixing ratios, species × layers. `None` until the first successful solve.
    pub fn mix_profile(&self) -> Option<&DMatrix<f64>> {
        self.mix_profile.as_ref()
    }

    /// Mean molecular weight per layer [kg].
    pub fn mu_profile(&self) -> Option<&DVector<f64>> {
        self.mu_profile.as_ref()
    }

    /// Raw output of the last successful solve.
    pub fn last_output(&self) -> Option<&SolverOutput> {
        self.last_output.as_ref()
    }

    pub fn last_status(&self) -> Option<SolverStatus> {
        self.last_status
    }

    /// Abundance vector pushed to the backend by the last solve.
    pub fn last_abundances(&self) -> &[f64] {
        &self.last_abundances
    }

    pub fn session(&self) -> &SolverSession<S> {
        &self.session
    }

    pub fn state(&self) -> &AbundanceState {
        &self.state
    }

    pub fn metallicity(&self) -> f64 {
        self.state.metallicity()
    }

    pub fn set_metallicity(&mut self, value: f64) -> ChemResult<()> {
        self.state.set_metallicity(value)
    }

    pub fn h_he_ratio(&self) -> f64 {
        self.state.h_he_ratio()
    }

    pub fn set_h_he_ratio(&mut self, value: f64) -> ChemResult<()> {
        self.state.set_h_he_ratio(value)
    }

    pub fn ratio(&self, element: &str) -> Option<f64> {
        self.state.ratio(element)
    }

    pub fn set_ratio(&mut self, element: &str, value: f64) -> ChemResult<()> {
        self.state.set_ratio(element, value)
    }

    pub fn fit_params(&self) -> &FitParamRegistry {
        &self.params
    }

    pub fn fit_param(&self, name: &str) -> ChemResult<&FitParam> {
        self.params.require(name)
    }

    pub fn get_param(&self, name: &str) -> ChemResult<f64> {
        Ok(self.params.require(name)?.get(&self.state))
    }

    pub fn set_param(&mut self, name: &str, value: f64) -> ChemResult<()> {
        self.params.require(name)?.set(&mut self.state, value)
    }

    /// Solve every layer and refresh the cached profiles.
    ///
    /// `temperature_k` in K and `pressure_pa` in Pa, one entry per layer.
    /// The cache is only replaced when the backend call returns `Ok`; layers
    /// flagged as non-converged are kept but logged.
    pub fn initialize_chemistry(&mut self, temperature_k: &[f64], pressure_pa: &[f64]) -> ChemResult<()> {
        check_profiles(temperature_k, pressure_pa)?;

        let abundances = self.state.reconcile(self.session.handle_mut())?;

        let pressure_bar = pressure_pa.iter().map(|p| to_bar(pa(*p))).collect();
        let input = SolverInput::gas_phase(temperature_k.to_vec(), pressure_bar);
        let mut output = SolverOutput::default();
        let status = self.session.handle_mut().calc_densities(&input, &mut output)?;

        let species = self.gases.len();
        let layers = temperature_k.len();
        if output.layers() != layers
            || output.number_densities.iter().any(|row| row.len() != species)
        {
            return Err(ChemError::Backend {
                message: format!(
                    "expected {layers} layers of {species} species, got {} layers",
                    output.layers()
                ),
            });
        }
        if output.mean_molecular_weight.len() != layers {
            return Err(ChemError::Backend {
                message: format!(
                    "expected {layers} mean molecular weights, got {}",
                    output.mean_molecular_weight.len()
                ),
            });
        }

        let mix = mixing_ratios(&output.number_densities, temperature_k, pressure_pa);
        let mu = DVector::from_iterator(
            output.mean_molecular_weight.len(),
            output.mean_molecular_weight.iter().map(|m| molar_mass_to_kg(*m)),
        );

        if !status.is_success() {
            warn!(%status, failed_layers = ?output.failed_layers(), "chemistry did not converge everywhere");
        } else {
            debug!(layers = temperature_k.len(), "chemistry solved");
        }

        self.mix_profile = Some(mix);
        self.mu_profile = Some(mu);
        self.last_output = Some(output);
        self.last_status = Some(status);
        self.last_abundances = abundances;
        Ok(())
    }
}

fn check_profiles(temperature_k: &[f64], pressure_pa: &[f64]) -> ChemResult<()> {
    if temperature_k.is_empty() {
        return Err(ChemError::InvalidArg {
            what: "temperature profile is empty".to_string(),
        });
    }
    if temperature_k.len() != pressure_pa.len() {
        return Err(ChemError::InvalidArg {
            what: format!(
                "temperature has {} layers but pressure has {}",
                temperature_k.len(),
                pressure_pa.len()
            ),
        });
    }
    if let Some(bad) = temperature_k
        .iter()
        .chain(pressure_pa)
        .find(|v| !v.is_finite() || **v <= 0.0)
    {
        return Err(ChemError::InvalidArg {
            what: format!("temperatures and pressures must be positive, got {bad}"),
        });
    }
    Ok(())
}

/// Number densities (layers × species) divided by the ideal-gas total density,
/// then renormalized so every layer column sums to one.
fn mixing_ratios(densities: &[Vec<f64>], temperature_k: &[f64], pressure_pa: &[f64]) -> DMatrix<f64> {
    let layers = densities.len();
    let species = densities.first().map_or(0, Vec::len);
    let mut mix = DMatrix::zeros(species, layers);

    for (layer, row) in densities.iter().enumerate() {
        let total = number_density_cgs(pressure_pa[layer], temperature_k[layer]);
        let mut column = mix.column_mut(layer);
        for (value, density) in column.iter_mut().zip(row) {
            *value = density / total;
        }
        let sum = column.sum();
        if sum > 0.0 {
            column /= sum;
        }
    }
    mix
}
