//! Error types for LP assembly and dispatch.

use sc_core::ScError;
use thiserror::Error;

/// Errors that can occur while building or dispatching an LP.
#[derive(Error, Debug)]
pub enum LpError {
    #[error("Validation error: {what}")]
    Validation { what: String },

    #[error("Backend error: {what}")]
    Backend { what: String },
}

pub type LpResult<T> = Result<T, LpError>;

impl From<LpError> for ScError {
    fn from(e: LpError) -> Self {
        match e {
            LpError::Validation { what: _ } => ScError::InvalidArg {
                what: "LP validation",
            },
            LpError::Backend { what: _ } => ScError::Invariant {
                what: "LP backend failure",
            },
        }
    }
}
