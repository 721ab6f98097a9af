//! Network-specific error types.

use sc_core::{NodeId, ScError};
use thiserror::Error;

pub type NetResult<T> = Result<T, NetError>;

/// Network construction and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetError {
    #[error("Network arrays have mismatched lengths: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Node {node} has receiver index {receiver} out of range (len={len})")]
    ReceiverOutOfRange {
        node: NodeId,
        receiver: usize,
        len: usize,
    },

    #[error("Node {node} drains into itself")]
    SelfLoop { node: NodeId },

    #[error("Node {node} already has a receiver")]
    DuplicateReceiver { node: NodeId },

    #[error("Node {node} has non-finite distance {value}")]
    NonFiniteDistance { node: NodeId, value: f64 },

    #[error("Edge {upstream}->{downstream} has non-positive distance drop {drop}")]
    NoDescent {
        upstream: NodeId,
        downstream: NodeId,
        drop: f64,
    },

    #[error("Node {node} cannot reach any outlet (cycle in receiver graph)")]
    Cycle { node: NodeId },

    #[error("Node {node} listed more than once in sub-network subset")]
    DuplicateNode { node: NodeId },
}

impl From<NetError> for ScError {
    fn from(e: NetError) -> Self {
        match e {
            NetError::LengthMismatch { expected, actual } => ScError::LengthMismatch {
                what: "network arrays",
                expected,
                actual,
            },
            NetError::NonFiniteDistance { value, .. } => ScError::NonFinite {
                what: "node distance",
                value,
            },
            NetError::ReceiverOutOfRange { .. } => ScError::InvalidArg {
                what: "receiver out of range",
            },
            NetError::SelfLoop { .. } => ScError::InvalidArg {
                what: "node drains into itself",
            },
            NetError::DuplicateReceiver { .. } => ScError::InvalidArg {
                what: "node already has a receiver",
            },
            NetError::NoDescent { .. } => ScError::Invariant {
                what: "edge with non-positive distance drop",
            },
            NetError::Cycle { .. } => ScError::Invariant {
                what: "node unreachable from any outlet",
            },
            NetError::DuplicateNode { .. } => ScError::InvalidArg {
                what: "duplicate node in sub-network subset",
            },
        }
    }
}
