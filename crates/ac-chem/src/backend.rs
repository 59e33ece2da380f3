//! Equilibrium backend traits.
//!
//! The numerical equilibrium solve lives in an external engine. This module
//! defines the narrow surface the adapter relies on: construct a session from
//! an abundance file and a reaction-constant dataset, query its element and
//! species lists, push new element abundances, and evaluate a set of layers.

use crate::error::ChemResult;
use crate::solver_io::{SolverInput, SolverOutput, SolverParameters, SolverStatus};
use std::path::Path;

/// Factory for backend sessions.
pub trait EquilibriumBackend {
    type Session: EquilibriumSession;

    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Build a session from a serialized abundance file and an equilibrium
    /// constant dataset. The abundance file may be deleted as soon as this returns.
    fn construct(
        &self,
        abundance_file: &Path,
        species_datafile: &Path,
        verbosity: u32,
    ) -> ChemResult<Self::Session>;
}

/// One constructed backend instance.
///
/// Element indices follow the order of the abundance file the session was
/// built from; species indices follow the backend's own species list.
pub trait EquilibriumSession {
    fn element_count(&self) -> usize;

    fn element_symbol(&self, index: usize) -> Option<&str>;

    /// Linear abundance relative to H.
    fn element_abundance(&self, index: usize) -> Option<f64>;

    fn gas_species_count(&self) -> usize;

    fn gas_species_symbol(&self, index: usize) -> Option<&str>;

    /// Replace all element abundances (linear, session element order).
    fn set_element_abundances(&mut self, abundances: &[f64]) -> ChemResult<()>;

    /// Forward tolerances and iteration caps. Backends without tunables ignore them.
    fn configure(&mut self, _params: &SolverParameters) {}

    /// Evaluate every layer of `input`, overwriting `output`.
    ///
    /// `Err` is reserved for failures that leave `output` unusable; convergence
    /// problems are reported through the returned status and `output.status_flags`.
    fn calc_densities(
        &mut self,
        input: &SolverInput,
        output: &mut SolverOutput,
    ) -> ChemResult<SolverStatus>;

    /// Element symbols in session order.
    fn element_symbols(&self) -> Vec<String> {
        (0..self.element_count())
            .filter_map(|i| self.element_symbol(i).map(str::to_string))
            .collect()
    }

    /// Gas species labels in backend order.
    fn gas_species(&self) -> Vec<String> {
        (0..self.gas_species_count())
            .filter_map(|i| self.gas_species_symbol(i).map(str::to_string))
            .collect()
    }
}
