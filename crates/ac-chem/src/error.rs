//! Chemistry adapter errors.

use ac_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for chemistry operations.
pub type ChemResult<T> = Result<T, ChemError>;

/// Errors raised while configuring or evaluating an equilibrium chemistry session.
#[derive(Error, Debug)]
pub enum ChemError {
    /// Parallel sequences (elements/abundances, ratio elements/values) differ in length.
    #[error("Length mismatch for {what}: {left} vs {right}")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    /// Inconsistent configuration detected before any backend call.
    #[error("Configuration error: {what}")]
    Config { what: String },

    /// A referenced abundance or dataset file does not exist.
    #[error("File {} not found", path.display())]
    MissingFile { path: PathBuf },

    /// Malformed line in an input file.
    #[error("Parse error in {} line {line}: {what}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        what: String,
    },

    /// Invalid argument at evaluation time.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    /// No fitting parameter registered under this name.
    #[error("Unknown fitting parameter: {name}")]
    UnknownParameter { name: String },

    /// Failure reported by the equilibrium backend, passed through as-is.
    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ChemError> for CoreError {
    fn from(err: ChemError) -> Self {
        match err {
            ChemError::LengthMismatch { what, left, right } => {
                CoreError::LengthMismatch { what, left, right }
            }
            ChemError::Config { what } => CoreError::InvalidArg {
                what: format!("chemistry configuration: {what}"),
            },
            ChemError::MissingFile { path } => CoreError::NotFound {
                what: path.display().to_string(),
            },
            ChemError::Core(inner) => inner,
            other => CoreError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
