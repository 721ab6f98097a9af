//! Network validation logic.

use sc_core::NodeId;

use crate::error::{NetError, NetResult};

/// Every node must reach an outlet by following receivers. An upstream BFS
/// from the outlets over donor adjacency visits exactly the valid nodes;
/// anything left over sits on a cycle.
pub(crate) fn validate_reachability(
    receivers: &[Option<NodeId>],
    donor_offsets: &[usize],
    donors: &[NodeId],
    outlets: &[NodeId],
) -> NetResult<()> {
    let n = receivers.len();
    let mut visited = vec![false; n];
    let mut queue: Vec<NodeId> = outlets.to_vec();
    for o in outlets {
        visited[o.idx()] = true;
    }

    while let Some(node) = queue.pop() {
        let start = donor_offsets[node.idx()];
        let end = donor_offsets[node.idx() + 1];
        for &donor in &donors[start..end] {
            if !visited[donor.idx()] {
                visited[donor.idx()] = true;
                queue.push(donor);
            }
        }
    }

    for (i, seen) in visited.iter().enumerate() {
        if !seen {
            return Err(NetError::Cycle {
                node: NodeId::from_usize(i),
            });
        }
    }
    Ok(())
}

/// Distances must be finite and strictly drop along every edge.
pub(crate) fn validate_distances(
    receivers: &[Option<NodeId>],
    distance: &[f64],
) -> NetResult<()> {
    for (i, &d) in distance.iter().enumerate() {
        if !d.is_finite() {
            return Err(NetError::NonFiniteDistance {
                node: NodeId::from_usize(i),
                value: d,
            });
        }
    }

    for (i, recv) in receivers.iter().enumerate() {
        if let Some(down) = recv {
            let up = NodeId::from_usize(i);
            let drop = distance[up.idx()] - distance[down.idx()];
            if drop <= 0.0 {
                return Err(NetError::NoDescent {
                    upstream: up,
                    downstream: *down,
                    drop,
                });
            }
        }
    }
    Ok(())
}
