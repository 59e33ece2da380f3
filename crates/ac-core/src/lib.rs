//! ac-core: stable foundation for atmochem.
//!
//! Contains:
//! - units (uom SI pressure, Pa constructor and bar conversion, molecular mass conversion)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
