//! ac-chem: equilibrium chemistry adapter for atmospheric retrievals.
//!
//! Provides:
//! - Solar element table, canonical element ordering and selection
//! - The abundance file format read by the equilibrium backend
//! - Backend traits (`EquilibriumBackend`, `EquilibriumSession`)
//! - Ratio-to-oxygen / metallicity parameterization of element abundances
//! - Species name reconciliation by elemental composition
//! - Named, bounded fitting parameters for an external optimizer
//!
//! # Architecture
//!
//! The numerical solve happens in an external equilibrium engine hidden behind
//! [`EquilibriumBackend`]. Everything in this crate is bookkeeping around it:
//! turning retrieval parameters into an abundance vector, and turning the
//! backend's number densities into mixing ratios the host understands.
//! [`FrozenSpeciationBackend`] is a deterministic stand-in used for demos and tests.
//!
//! # Example
//!
//! ```no_run
//! use ac_chem::{ChemistryConfig, DEFAULT_CANONICAL_SPECIES, EquilibriumChemistry, FrozenSpeciationBackend};
//!
//! let config = ChemistryConfig::default().with_selected_elements(&["H", "He", "O", "C", "N"]);
//! let mut chem =
//!     EquilibriumChemistry::new(&FrozenSpeciationBackend, &config, &DEFAULT_CANONICAL_SPECIES).unwrap();
//!
//! chem.set_param("C_O_ratio", 0.6).unwrap();
//! chem.initialize_chemistry(&[1500.0, 1200.0], &[1e5, 1e3]).unwrap();
//! println!("{:?}", chem.gases());
//! ```

pub mod abundance_file;
pub mod backend;
pub mod catalog;
pub mod chemistry;
pub mod config;
pub mod elements;
pub mod error;
pub mod formula;
pub mod params;
pub mod ratios;
pub mod session;
pub mod solver_io;
pub mod surrogate;

// Re-exports for ergonomics
pub use abundance_file::{abundance_string, load_abundance_file, parse_abundance_text};
pub use backend::{EquilibriumBackend, EquilibriumSession};
pub use catalog::{CanonicalCatalog, DEFAULT_CANONICAL_SPECIES, reconcile_species};
pub use chemistry::{CITATION, EquilibriumChemistry, INPUT_KEYWORDS};
pub use config::{ChemistryConfig, LogKDataset, load_config, save_config};
pub use elements::{ElementTable, SOLAR_ABUNDANCES, atomic_weight, normalize_order, select_elements};
pub use error::{ChemError, ChemResult};
pub use formula::{ElementalComposition, element_count};
pub use params::{FitParam, FitParamRegistry, ParamScale};
pub use ratios::{AbundanceState, RatioOverrides, RatioSet};
pub use session::{SolverSession, create_session};
pub use solver_io::{SolverInput, SolverOutput, SolverParameters, SolverStatus};
pub use surrogate::{FrozenSpeciationBackend, FrozenSpeciationSession};
