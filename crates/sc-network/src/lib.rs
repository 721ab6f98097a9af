//! sc-network: stream network layer for streamcarve.
//!
//! Provides:
//! - Core network data structure (`StreamNet`): fixed node ordering, one
//!   downstream receiver per non-outlet node, along-channel distance
//! - Incremental builder with validation (`NetBuilder`)
//! - Sub-network extraction with parent-index mapping (`SubNet`)
//! - Node attribute alignment checks
//!
//! # Example
//!
//! ```
//! use sc_network::NetBuilder;
//!
//! let mut builder = NetBuilder::new();
//! let head = builder.add_node(10.0);
//! let outlet = builder.add_node(0.0);
//! builder.connect(head, outlet).unwrap();
//! let net = builder.build().unwrap();
//!
//! assert_eq!(net.len(), 2);
//! assert_eq!(net.outlets(), &[outlet]);
//! ```

pub mod attrs;
pub mod builder;
pub mod error;
pub mod net;
pub mod subnet;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use attrs::{NodeAttrs, ensure_aligned};
pub use builder::NetBuilder;
pub use error::{NetError, NetResult};
pub use net::StreamNet;
pub use subnet::SubNet;
