//! Backend session construction.
//!
//! The backend only accepts element abundances as a file, so construction goes
//! through a temporary file that lives exactly as long as the construct call.

use crate::abundance_file::{load_abundance_file, table_string};
use crate::backend::{EquilibriumBackend, EquilibriumSession};
use crate::elements::ElementTable;
use crate::error::{ChemError, ChemResult};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Verbosity level requested from the backend at construction.
pub const BACKEND_VERBOSITY: u32 = 1;

/// A constructed backend session plus the element metadata it reported.
#[derive(Debug)]
pub struct SolverSession<S> {
    handle: S,
    elements: Vec<String>,
    baseline: Vec<f64>,
}

impl<S: EquilibriumSession> SolverSession<S> {
    /// Wrap a session, capturing its element list and baseline abundances.
    pub fn new(handle: S) -> ChemResult<Self> {
        let count = handle.element_count();
        let mut elements = Vec::with_capacity(count);
        let mut baseline = Vec::with_capacity(count);
        for i in 0..count {
            let (Some(symbol), Some(abundance)) =
                (handle.element_symbol(i), handle.element_abundance(i))
            else {
                return Err(ChemError::Backend {
                    message: format!("session reports {count} elements but index {i} is missing"),
                });
            };
            elements.push(symbol.to_string());
            baseline.push(abundance);
        }

        Ok(Self {
            handle,
            elements,
            baseline,
        })
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn element_symbol(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(String::as_str)
    }

    /// Linear baseline abundance (relative to H) at construction.
    pub fn baseline_abundance(&self, index: usize) -> Option<f64> {
        self.baseline.get(index).copied()
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn baseline(&self) -> &[f64] {
        &self.baseline
    }

    pub fn handle(&self) -> &S {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut S {
        &mut self.handle
    }
}

/// Resolve the base element table: a user abundance file, or the solar table.
pub fn base_table(abundance_file: Option<&Path>) -> ChemResult<ElementTable> {
    match abundance_file {
        Some(path) => load_abundance_file(path),
        None => Ok(ElementTable::solar()),
    }
}

/// Build a backend session for the selected elements.
///
/// Steps: load the base table, apply the selection, serialize, write to a
/// temporary file, construct. The temporary file is removed on every exit path.
pub fn create_session<B: EquilibriumBackend>(
    backend: &B,
    species_datafile: &Path,
    selected_elements: Option<&[String]>,
    abundance_file: Option<&Path>,
) -> ChemResult<SolverSession<B::Session>> {
    if !species_datafile.exists() {
        return Err(ChemError::MissingFile {
            path: species_datafile.to_path_buf(),
        });
    }

    let table = base_table(abundance_file)?.select(selected_elements);
    if table.is_empty() {
        return Err(ChemError::Config {
            what: "no elements left after selection".to_string(),
        });
    }
    let text = table_string(&table);
    debug!(elements = ?table.symbols(), "serialized abundance table");

    let session = {
        let mut file = tempfile::Builder::new()
            .prefix("atmochem-abund-")
            .suffix(".dat")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        backend.construct(file.path(), species_datafile, BACKEND_VERBOSITY)?
    };

    let session = SolverSession::new(session)?;
    info!(
        backend = backend.name(),
        elements = session.element_count(),
        species = session.handle().gas_species_count(),
        datafile = %species_datafile.display(),
        "constructed equilibrium session"
    );
    Ok(session)
}
