//! Error types for carve orchestration.

use sc_core::ScError;
use sc_lp::LpError;
use sc_network::NetError;
use thiserror::Error;

/// Errors that abort a carve before any sub-problem is dispatched.
///
/// Solver failures on individual sub-networks are not errors; they surface
/// as NaN-filled output plus a failed [`crate::SolveReport`].
#[derive(Error, Debug)]
pub enum CarveError {
    #[error("Validation error: {what}")]
    Validation { what: String },

    #[error("Network error: {0}")]
    Net(#[from] NetError),

    #[error("LP error: {0}")]
    Lp(#[from] LpError),
}

pub type CarveResult<T> = Result<T, CarveError>;

impl From<CarveError> for ScError {
    fn from(e: CarveError) -> Self {
        match e {
            CarveError::Validation { what: _ } => ScError::InvalidArg {
                what: "carve validation",
            },
            CarveError::Net(inner) => inner.into(),
            CarveError::Lp(inner) => inner.into(),
        }
    }
}
