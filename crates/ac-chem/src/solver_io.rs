//! Input/output records exchanged with an equilibrium backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-layer conditions handed to the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverInput {
    /// Temperature per layer [K]
    pub temperature: Vec<f64>,
    /// Pressure per layer [bar]
    pub pressure: Vec<f64>,
    /// Condensation is not modelled by this adapter; always false.
    pub equilibrium_condensation: bool,
    pub rainout_condensation: bool,
}

impl SolverInput {
    /// Gas-phase only input. `pressure_bar` must already be in bar.
    pub fn gas_phase(temperature: Vec<f64>, pressure_bar: Vec<f64>) -> Self {
        Self {
            temperature,
            pressure: pressure_bar,
            equilibrium_condensation: false,
            rainout_condensation: false,
        }
    }

    pub fn layers(&self) -> usize {
        self.temperature.len()
    }
}

/// Pre-allocated result buffers filled in by the backend.
///
/// Layer-major: `number_densities[layer][species]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverOutput {
    /// Gas number densities [cm⁻³], layers × species
    pub number_densities: Vec<Vec<f64>>,
    /// Total element density [cm⁻³] per layer
    pub total_element_density: Vec<f64>,
    /// Mean molecular weight [g/mol] per layer
    pub mean_molecular_weight: Vec<f64>,
    /// Condensate number densities, layers × condensates (empty without condensation)
    pub number_densities_cond: Vec<Vec<f64>>,
    /// Degree of condensation per layer and element
    pub element_cond_degree: Vec<Vec<f64>>,
    /// Element conservation check per layer and element (1 = conserved)
    pub element_conserved: Vec<Vec<u32>>,
    pub nb_chemistry_iterations: Vec<u32>,
    pub nb_cond_iterations: Vec<u32>,
    pub nb_iterations: Vec<u32>,
    /// Raw backend status code per layer
    pub status_flags: Vec<u32>,
}

impl SolverOutput {
    pub fn layers(&self) -> usize {
        self.number_densities.len()
    }

    /// Layers whose status code is not success.
    pub fn failed_layers(&self) -> Vec<usize> {
        self.status_flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| SolverStatus::from_code(**flag) != SolverStatus::Success)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Status code reported by the backend, passed through without interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    Success,
    NoConvergence,
    InitializationFailed,
    IsBusy,
    WrongInputValues,
    PhaseRuleViolation,
    Unknown(u32),
}

impl SolverStatus {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::NoConvergence,
            2 => Self::InitializationFailed,
            3 => Self::IsBusy,
            4 => Self::WrongInputValues,
            5 => Self::PhaseRuleViolation,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Success => 0,
            Self::NoConvergence => 1,
            Self::InitializationFailed => 2,
            Self::IsBusy => 3,
            Self::WrongInputValues => 4,
            Self::PhaseRuleViolation => 5,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "convergence ok"),
            Self::NoConvergence => write!(f, "convergence failed"),
            Self::InitializationFailed => write!(f, "initialization failed"),
            Self::IsBusy => write!(f, "solver busy"),
            Self::WrongInputValues => write!(f, "wrong input values"),
            Self::PhaseRuleViolation => write!(f, "phase rule violation"),
            Self::Unknown(code) => write!(f, "unknown status {code}"),
        }
    }
}

/// Iteration caps and tolerances forwarded verbatim to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParameters {
    pub chem_accuracy: f64,
    pub pressure_accuracy: f64,
    pub newton_error: f64,
    pub max_chem_iter: u32,
    pub max_press_iter: u32,
    pub max_nelder_mead_iter: u32,
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            chem_accuracy: 1e-4,
            pressure_accuracy: 1e-4,
            newton_error: 1e-4,
            max_chem_iter: 300,
            max_press_iter: 100,
            max_nelder_mead_iter: 100,
        }
    }
}
