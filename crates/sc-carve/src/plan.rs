//! Explicit solve plan.
//!
//! Decomposition produces a flat task list instead of recursing: each task
//! is one leaf sub-network, and a tributary task records a dependency edge
//! on its trunk task. The executor runs dependency-free tasks first, merges
//! them, then runs the dependent wave with boundary values read from the
//! merged result.

use sc_core::NodeId;
use sc_network::{StreamNet, SubNet};
use tracing::debug;

use crate::decompose::{split_basins, split_trunk_tributaries};
use crate::error::{CarveError, CarveResult};

/// Decomposition entry level.
///
/// Three levels, selected explicitly by the caller; the same solve routine
/// runs at every level with different framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Full split: per-basin, then trunk/tributaries within each basin.
    #[default]
    Basins,
    /// Mid-level split of a single basin into trunk and tributaries.
    TrunkTributaries,
    /// Solve the given network as a single leaf problem.
    None,
}

/// Dependency of a tributary task on its trunk task.
#[derive(Debug, Clone, Copy)]
pub struct Boundary {
    /// Task whose merged result supplies the boundary value.
    pub task: usize,
    /// Root-frame junction node; the boundary value is the trunk's fitted
    /// elevation there.
    pub junction: NodeId,
}

/// One leaf sub-problem.
#[derive(Debug, Clone)]
pub struct SolveTask {
    pub id: usize,
    pub label: String,
    pub subnet: SubNet,
    pub boundary: Option<Boundary>,
}

impl SolveTask {
    /// Whether this task owns a given local node for result scatter.
    ///
    /// A tributary borrows its junction from the trunk and must not write
    /// it back.
    pub fn owns(&self, local: NodeId) -> bool {
        match &self.boundary {
            Some(b) => self.subnet.parent_of(local) != b.junction,
            None => true,
        }
    }
}

/// The full decomposition of one carve call.
#[derive(Debug, Clone)]
pub struct SolvePlan {
    pub tasks: Vec<SolveTask>,
}

/// Decompose a network into a solve plan at the requested level.
pub fn plan(net: &StreamNet, mode: SplitMode) -> CarveResult<SolvePlan> {
    let mut tasks = Vec::new();

    match mode {
        SplitMode::None => {
            tasks.push(SolveTask {
                id: 0,
                label: format!("network ({} nodes)", net.len()),
                subnet: SubNet::whole(net),
                boundary: None,
            });
        }
        SplitMode::TrunkTributaries => {
            if net.outlets().len() != 1 {
                return Err(CarveError::Validation {
                    what: format!(
                        "trunk/tributary split requires a single basin, network has {} outlets",
                        net.outlets().len()
                    ),
                });
            }
            push_basin(&mut tasks, &SubNet::whole(net), "")?;
        }
        SplitMode::Basins => {
            for (b, basin) in split_basins(net)?.iter().enumerate() {
                push_basin(&mut tasks, basin, &format!("basin {b}: "))?;
            }
        }
    }

    debug!(mode = ?mode, tasks = tasks.len(), "decomposition planned");
    Ok(SolvePlan { tasks })
}

fn push_basin(tasks: &mut Vec<SolveTask>, basin: &SubNet, prefix: &str) -> CarveResult<()> {
    let (trunk, tributaries) = split_trunk_tributaries(basin)?;

    let trunk_id = tasks.len();
    tasks.push(SolveTask {
        id: trunk_id,
        label: format!("{prefix}trunk ({} nodes)", trunk.len()),
        subnet: trunk,
        boundary: None,
    });

    for tr in tributaries {
        let id = tasks.len();
        tasks.push(SolveTask {
            id,
            label: format!(
                "{prefix}tributary at node {} ({} nodes)",
                tr.junction,
                tr.subnet.len() - 1
            ),
            subnet: tr.subnet,
            boundary: Some(Boundary {
                task: trunk_id,
                junction: tr.junction,
            }),
        });
    }
    Ok(())
}
