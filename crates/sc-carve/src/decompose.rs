//! Network decomposition: basins, trunk, tributaries.

use sc_core::NodeId;
use sc_network::{NetResult, StreamNet, SubNet};

/// Split a network into its independent drainage basins.
///
/// Each basin is the outlet-rooted tree of one outlet; basins share no
/// nodes and are returned in outlet order.
pub fn split_basins(net: &StreamNet) -> NetResult<Vec<SubNet>> {
    let n = net.len();

    // Memoized root walk: every node resolves to its outlet in O(n) total.
    let mut root: Vec<Option<NodeId>> = vec![None; n];
    for i in 0..n {
        let mut path = Vec::new();
        let mut cur = NodeId::from_usize(i);
        while root[cur.idx()].is_none() {
            match net.receiver(cur) {
                Some(next) => {
                    path.push(cur);
                    cur = next;
                }
                None => root[cur.idx()] = Some(cur),
            }
        }
        let r = root[cur.idx()].unwrap_or(cur);
        for p in path {
            root[p.idx()] = Some(r);
        }
    }

    let mut basins = Vec::with_capacity(net.outlets().len());
    for &outlet in net.outlets() {
        let nodes: Vec<NodeId> = (0..n)
            .map(NodeId::from_usize)
            .filter(|i| root[i.idx()] == Some(outlet))
            .collect();
        basins.push(SubNet::extract(net, &nodes)?);
    }
    Ok(basins)
}

/// The trunk of a single-basin network: the flow path from the
/// maximum-distance headwater down to the outlet, head first.
///
/// Ties on distance break toward the lower node index.
pub fn trunk_path(net: &StreamNet) -> Vec<NodeId> {
    debug_assert_eq!(net.outlets().len(), 1);

    let mut head = NodeId::from_usize(0);
    for i in 1..net.len() {
        let cand = NodeId::from_usize(i);
        if net.distance(cand) > net.distance(head) {
            head = cand;
        }
    }

    let mut path = vec![head];
    let mut cur = head;
    while let Some(next) = net.receiver(cur) {
        path.push(next);
        cur = next;
    }
    path
}

/// One tributary of a trunk: its subtree plus the borrowed junction node.
#[derive(Debug, Clone)]
pub struct Tributary {
    /// Subtree nodes plus the junction, which is the local outlet. Mapped
    /// to the root frame.
    pub subnet: SubNet,
    /// Root-frame ID of the junction node. Owned by the trunk; the
    /// tributary only pins its fitted value.
    pub junction: NodeId,
}

/// Split a single basin into its trunk and tributaries.
///
/// Every off-trunk subtree joining the trunk becomes one tributary;
/// tributaries do not overlap and together with the trunk cover the basin
/// exactly. Tributaries are ordered walking the trunk head to outlet,
/// donors in node order.
pub fn split_trunk_tributaries(basin: &SubNet) -> NetResult<(SubNet, Vec<Tributary>)> {
    let net = basin.net();
    let trunk_nodes = trunk_path(net);

    let mut on_trunk = vec![false; net.len()];
    for t in &trunk_nodes {
        on_trunk[t.idx()] = true;
    }

    let trunk = basin.extract_within(&trunk_nodes)?;

    let mut tributaries = Vec::new();
    for &t in &trunk_nodes {
        for &donor in net.donors(t) {
            if on_trunk[donor.idx()] {
                continue;
            }
            // Collect the subtree rooted at this off-trunk donor.
            let mut nodes = vec![donor];
            let mut stack = vec![donor];
            while let Some(x) = stack.pop() {
                for &y in net.donors(x) {
                    nodes.push(y);
                    stack.push(y);
                }
            }
            nodes.push(t);
            tributaries.push(Tributary {
                subnet: basin.extract_within(&nodes)?,
                junction: basin.parent_of(t),
            });
        }
    }

    Ok((trunk, tributaries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> NodeId {
        NodeId::from_usize(i)
    }

    #[test]
    fn basins_group_by_outlet() {
        // Two chains: 0 -> 1 (outlet), 2 -> 3 (outlet)
        let net = StreamNet::from_receivers(
            &[Some(1), None, Some(3), None],
            &[10.0, 0.0, 8.0, 0.0],
        )
        .unwrap();
        let basins = split_basins(&net).unwrap();
        assert_eq!(basins.len(), 2);
        assert_eq!(basins[0].parent_nodes(), &[id(0), id(1)]);
        assert_eq!(basins[1].parent_nodes(), &[id(2), id(3)]);
    }

    #[test]
    fn single_basin_covers_everything() {
        let net = StreamNet::from_receivers(
            &[Some(2), Some(2), Some(3), None],
            &[20.0, 25.0, 10.0, 0.0],
        )
        .unwrap();
        let basins = split_basins(&net).unwrap();
        assert_eq!(basins.len(), 1);
        assert_eq!(basins[0].len(), 4);
    }

    #[test]
    fn trunk_follows_farthest_headwater() {
        // Y: node 1 (distance 25) beats node 0 (distance 20)
        let net = StreamNet::from_receivers(
            &[Some(2), Some(2), Some(3), None],
            &[20.0, 25.0, 10.0, 0.0],
        )
        .unwrap();
        let path = trunk_path(&net);
        assert_eq!(path, vec![id(1), id(2), id(3)]);
    }

    #[test]
    fn tributary_borrows_junction() {
        let net = StreamNet::from_receivers(
            &[Some(2), Some(2), Some(3), None],
            &[20.0, 25.0, 10.0, 0.0],
        )
        .unwrap();
        let basin = SubNet::whole(&net);
        let (trunk, tribs) = split_trunk_tributaries(&basin).unwrap();

        assert_eq!(trunk.parent_nodes(), &[id(1), id(2), id(3)]);
        assert_eq!(tribs.len(), 1);
        // Subtree {0} plus junction 2
        assert_eq!(tribs[0].subnet.parent_nodes(), &[id(0), id(2)]);
        assert_eq!(tribs[0].junction, id(2));
        // The junction is the tributary's local outlet.
        let local = tribs[0].subnet.local_of(id(2)).unwrap();
        assert_eq!(tribs[0].subnet.net().receiver(local), None);
    }

    #[test]
    fn nested_tributary_subtree_is_complete() {
        // Side branch with its own fork:
        // 0 -> 1 -> 4, 2 -> 1, 3 -> 4, 4 -> 5 (outlet); trunk via 3? No:
        // distances make node 0 the farthest headwater on the main stem.
        let net = StreamNet::from_receivers(
            &[Some(1), Some(4), Some(1), Some(4), Some(5), None],
            &[30.0, 20.0, 28.0, 12.0, 10.0, 0.0],
        )
        .unwrap();
        let basin = SubNet::whole(&net);
        let (trunk, tribs) = split_trunk_tributaries(&basin).unwrap();

        assert_eq!(trunk.parent_nodes(), &[id(0), id(1), id(4), id(5)]);
        assert_eq!(tribs.len(), 2);
        // Donor 2 joins the trunk at node 1.
        assert_eq!(tribs[0].subnet.parent_nodes(), &[id(1), id(2)]);
        assert_eq!(tribs[0].junction, id(1));
        // Donor 3 joins the trunk at node 4.
        assert_eq!(tribs[1].subnet.parent_nodes(), &[id(3), id(4)]);
        assert_eq!(tribs[1].junction, id(4));
    }

    #[test]
    fn trunk_and_tributaries_partition_basin() {
        let net = StreamNet::from_receivers(
            &[Some(1), Some(4), Some(1), Some(4), Some(5), None],
            &[30.0, 20.0, 28.0, 12.0, 10.0, 0.0],
        )
        .unwrap();
        let basin = SubNet::whole(&net);
        let (trunk, tribs) = split_trunk_tributaries(&basin).unwrap();

        let mut owned: Vec<usize> = trunk.parent_nodes().iter().map(|p| p.idx()).collect();
        for tr in &tribs {
            for p in tr.subnet.parent_nodes() {
                if *p != tr.junction {
                    owned.push(p.idx());
                }
            }
        }
        owned.sort_unstable();
        assert_eq!(owned, (0..net.len()).collect::<Vec<_>>());
    }
}
