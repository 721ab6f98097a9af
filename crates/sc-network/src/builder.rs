//! Incremental network builder.

use sc_core::NodeId;

use crate::error::{NetError, NetResult};
use crate::net::StreamNet;
use crate::validate;

/// Builder for constructing a stream network incrementally.
///
/// Use `add_node` and `connect` to lay out the network, then call `build()`
/// to validate and freeze it into an immutable `StreamNet`.
#[derive(Debug, Default)]
pub struct NetBuilder {
    distance: Vec<f64>,
    receivers: Vec<Option<NodeId>>,
}

impl NetBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its along-channel distance and return its ID.
    pub fn add_node(&mut self, distance: f64) -> NodeId {
        let id = NodeId::from_usize(self.distance.len());
        self.distance.push(distance);
        self.receivers.push(None);
        id
    }

    /// Connect `upstream` to its downstream receiver.
    ///
    /// Each node drains to at most one receiver; a second `connect` on the
    /// same upstream node is rejected.
    pub fn connect(&mut self, upstream: NodeId, downstream: NodeId) -> NetResult<()> {
        let len = self.distance.len();
        if upstream.idx() >= len {
            return Err(NetError::ReceiverOutOfRange {
                node: upstream,
                receiver: upstream.idx(),
                len,
            });
        }
        if downstream.idx() >= len {
            return Err(NetError::ReceiverOutOfRange {
                node: upstream,
                receiver: downstream.idx(),
                len,
            });
        }
        if upstream == downstream {
            return Err(NetError::SelfLoop { node: upstream });
        }
        if self.receivers[upstream.idx()].is_some() {
            return Err(NetError::DuplicateReceiver { node: upstream });
        }
        self.receivers[upstream.idx()] = Some(downstream);
        Ok(())
    }

    /// Build and validate the network, returning an immutable `StreamNet`.
    ///
    /// Validation rejects cycles (nodes that cannot reach an outlet),
    /// non-finite distances, and edges with non-positive distance drop.
    pub fn build(self) -> NetResult<StreamNet> {
        let (donor_offsets, donors) = Self::build_donors(&self.receivers);

        let outlets: Vec<NodeId> = self
            .receivers
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(i, _)| NodeId::from_usize(i))
            .collect();

        validate::validate_reachability(&self.receivers, &donor_offsets, &donors, &outlets)?;
        validate::validate_distances(&self.receivers, &self.distance)?;

        Ok(StreamNet {
            receivers: self.receivers,
            distance: self.distance,
            donor_offsets,
            donors,
            outlets,
        })
    }

    /// Build compact donor adjacency: for each node, the nodes draining into it.
    fn build_donors(receivers: &[Option<NodeId>]) -> (Vec<usize>, Vec<NodeId>) {
        let n = receivers.len();
        let mut counts = vec![0usize; n];
        for recv in receivers.iter().flatten() {
            counts[recv.idx()] += 1;
        }

        let mut offsets = vec![0usize; n + 1];
        for i in 0..n {
            offsets[i + 1] = offsets[i] + counts[i];
        }

        // Counting sort keyed by receiver; upstream node order preserved
        // within each bucket, so the layout is deterministic.
        let mut donors = vec![NodeId::from_index(0); offsets[n]];
        let mut cursor = offsets.clone();
        for (i, recv) in receivers.iter().enumerate() {
            if let Some(d) = recv {
                donors[cursor[d.idx()]] = NodeId::from_usize(i);
                cursor[d.idx()] += 1;
            }
        }

        (offsets, donors)
    }
}
