//! sc-core: stable foundation for streamcarve.
//!
//! Contains:
//! - ids (stable compact IDs for network nodes and solve tasks)
//! - error (shared error types)
//! - numeric (float helpers + tolerances)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{ScError, ScResult};
pub use ids::*;
pub use numeric::*;
