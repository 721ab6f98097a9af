//! Node attribute arrays.
//!
//! Attributes (elevation samples, fitted elevations) travel as dense arrays
//! aligned 1:1 with the network's node ordering. The arrays carry no
//! positional metadata of their own; alignment is checked once at entry.

use crate::error::{NetError, NetResult};
use crate::net::StreamNet;

/// A dense per-node attribute array aligned with a network's node ordering.
pub type NodeAttrs = Vec<f64>;

/// Check that an attribute array lines up with the network.
pub fn ensure_aligned(net: &StreamNet, attrs: &[f64]) -> NetResult<()> {
    if attrs.len() != net.len() {
        return Err(NetError::LengthMismatch {
            expected: net.len(),
            actual: attrs.len(),
        });
    }
    Ok(())
}
