//! Sub-network extraction.

use sc_core::NodeId;

use crate::error::{NetError, NetResult};
use crate::net::StreamNet;

/// A sub-network: a node subset of a parent network with its own local
/// topology plus the mapping from local node IDs back to parent node IDs.
///
/// Local node order preserves parent relative order, so `parent_nodes` is
/// strictly ascending. A subset node whose receiver falls outside the subset
/// becomes a local outlet; that is how a tributary borrows its junction node
/// as a pinned boundary.
#[derive(Debug, Clone)]
pub struct SubNet {
    net: StreamNet,
    parent_nodes: Vec<NodeId>,
}

impl SubNet {
    /// View an entire network as a sub-network of itself (identity mapping).
    pub fn whole(net: &StreamNet) -> Self {
        let parent_nodes = (0..net.len()).map(NodeId::from_usize).collect();
        Self {
            net: net.clone(),
            parent_nodes,
        }
    }

    /// Extract the sub-network induced by `nodes` from `parent`.
    ///
    /// The subset is sorted into parent order; duplicates are rejected.
    pub fn extract(parent: &StreamNet, nodes: &[NodeId]) -> NetResult<Self> {
        let mut subset: Vec<NodeId> = nodes.to_vec();
        subset.sort();
        for pair in subset.windows(2) {
            if pair[0] == pair[1] {
                return Err(NetError::DuplicateNode { node: pair[0] });
            }
        }

        // Parent -> local index map
        let mut local_of = vec![None; parent.len()];
        for (local, p) in subset.iter().enumerate() {
            local_of[p.idx()] = Some(NodeId::from_usize(local));
        }

        let receivers: Vec<Option<NodeId>> = subset
            .iter()
            .map(|p| parent.receiver(*p).and_then(|d| local_of[d.idx()]))
            .collect();
        let distance: Vec<f64> = subset.iter().map(|p| parent.distance(*p)).collect();

        let local: Vec<Option<usize>> = receivers.iter().map(|r| r.map(|d| d.idx())).collect();
        let net = StreamNet::from_receivers(&local, &distance)?;

        Ok(Self {
            net,
            parent_nodes: subset,
        })
    }

    /// Extract a nested sub-network, composing the parent mapping so the
    /// result maps straight to the root frame.
    pub fn extract_within(&self, local_nodes: &[NodeId]) -> NetResult<Self> {
        let mut sub = Self::extract(&self.net, local_nodes)?;
        for p in &mut sub.parent_nodes {
            *p = self.parent_nodes[p.idx()];
        }
        Ok(sub)
    }

    /// The local topology.
    pub fn net(&self) -> &StreamNet {
        &self.net
    }

    /// Number of local nodes.
    pub fn len(&self) -> usize {
        self.net.len()
    }

    pub fn is_empty(&self) -> bool {
        self.net.is_empty()
    }

    /// Parent node ID of a local node.
    pub fn parent_of(&self, local: NodeId) -> NodeId {
        self.parent_nodes[local.idx()]
    }

    /// All parent node IDs in local order (strictly ascending).
    pub fn parent_nodes(&self) -> &[NodeId] {
        &self.parent_nodes
    }

    /// Local ID of a parent node, if it belongs to this sub-network.
    pub fn local_of(&self, parent: NodeId) -> Option<NodeId> {
        self.parent_nodes
            .binary_search(&parent)
            .ok()
            .map(NodeId::from_usize)
    }

    /// Gather a parent-frame attribute array into local order.
    pub fn gather(&self, attrs: &[f64]) -> Vec<f64> {
        self.parent_nodes.iter().map(|p| attrs[p.idx()]).collect()
    }
}
