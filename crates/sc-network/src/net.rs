//! Core stream network data structure.

use sc_core::NodeId;

use crate::builder::NetBuilder;
use crate::error::{NetError, NetResult};

/// A validated, immutable stream network.
///
/// Node identity is position in the fixed node ordering. Each non-outlet
/// node has exactly one downstream receiver, so the network is a forest of
/// trees flowing toward outlets. Per-node distance is measured upstream from
/// the basin outlet along the channel, so every edge drops:
/// `distance(upstream) > distance(downstream)`.
///
/// The structure stores:
/// - the receiver (downstream) edge per node
/// - per-node along-channel distance
/// - compact donor (upstream) adjacency in CSR form
/// - the list of outlet nodes
#[derive(Debug, Clone)]
pub struct StreamNet {
    pub(crate) receivers: Vec<Option<NodeId>>,
    pub(crate) distance: Vec<f64>,

    /// Offsets for node->donor adjacency: node i's donors are in
    /// donors[donor_offsets[i]..donor_offsets[i+1]].
    pub(crate) donor_offsets: Vec<usize>,

    /// Flat list of donor node IDs (sorted by receiver then donor for determinism).
    pub(crate) donors: Vec<NodeId>,

    pub(crate) outlets: Vec<NodeId>,
}

impl StreamNet {
    /// Build a network directly from a receiver array (`None` marks outlets)
    /// and per-node distances.
    pub fn from_receivers(receivers: &[Option<usize>], distance: &[f64]) -> NetResult<Self> {
        if receivers.len() != distance.len() {
            return Err(NetError::LengthMismatch {
                expected: receivers.len(),
                actual: distance.len(),
            });
        }
        let mut builder = NetBuilder::new();
        let ids: Vec<NodeId> = distance.iter().map(|&d| builder.add_node(d)).collect();
        for (i, recv) in receivers.iter().enumerate() {
            if let Some(r) = recv {
                if *r >= ids.len() {
                    return Err(NetError::ReceiverOutOfRange {
                        node: ids[i],
                        receiver: *r,
                        len: ids.len(),
                    });
                }
                builder.connect(ids[i], ids[*r])?;
            }
        }
        builder.build()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    /// Number of directed edges (nodes minus outlets).
    pub fn edge_count(&self) -> usize {
        self.len() - self.outlets.len()
    }

    /// Downstream receiver of a node, `None` at outlets.
    pub fn receiver(&self, node: NodeId) -> Option<NodeId> {
        self.receivers[node.idx()]
    }

    /// Along-channel distance of a node, measured upstream from the outlet.
    pub fn distance(&self, node: NodeId) -> f64 {
        self.distance[node.idx()]
    }

    /// All per-node distances in node order.
    pub fn distances(&self) -> &[f64] {
        &self.distance
    }

    /// Donor (upstream) nodes draining directly into `node`.
    pub fn donors(&self, node: NodeId) -> &[NodeId] {
        let idx = node.idx();
        let start = self.donor_offsets[idx];
        let end = self.donor_offsets[idx + 1];
        &self.donors[start..end]
    }

    /// Outlet nodes (no receiver), in node order.
    pub fn outlets(&self) -> &[NodeId] {
        &self.outlets
    }

    /// Iterate directed edges as (upstream, downstream) pairs, in upstream
    /// node order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.receivers
            .iter()
            .enumerate()
            .filter_map(|(i, recv)| recv.map(|d| (NodeId::from_usize(i), d)))
    }

    /// Walk the receiver chain to the outlet this node drains to.
    ///
    /// Validation guarantees termination.
    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut cur = node;
        while let Some(next) = self.receivers[cur.idx()] {
            cur = next;
        }
        cur
    }
}
