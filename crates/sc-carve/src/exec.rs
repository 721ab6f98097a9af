//! Carve execution: validate, plan, solve in parallel waves, merge.

use std::time::Duration;

use rayon::prelude::*;
use sc_core::ensure_all_finite;
use sc_lp::{
    ClarabelSolver, LpSolve, ProfileParams, SolveStatus, SolverOptions, build_profile_lp,
    fitted_block,
};
use sc_network::{NodeAttrs, StreamNet, ensure_aligned};
use tracing::{debug, warn};

use crate::error::{CarveError, CarveResult};
use crate::plan::{SolveTask, SplitMode, plan};

/// Options for one carve call.
#[derive(Debug, Clone, Copy)]
pub struct CarveOptions {
    /// Target quantile in (0, 1).
    pub tau: f64,
    /// Minimum downward gradient per unit channel distance (>= 0).
    pub min_gradient: f64,
    /// Decomposition entry level.
    pub split: SplitMode,
    /// Backend configuration, passed through per solve.
    pub solver: SolverOptions,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            tau: 0.5,
            min_gradient: 0.0,
            split: SplitMode::default(),
            solver: SolverOptions::default(),
        }
    }
}

/// Diagnostics of one leaf solve. Aggregated in task order, never dropped.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub task: usize,
    pub label: String,
    /// Local node count of the sub-network.
    pub nodes: usize,
    pub status: SolveStatus,
    pub iterations: u32,
    /// Objective value (NaN when the solve produced no usable solution).
    pub objective: f64,
    pub solve_time: Duration,
    /// Failure detail, if the leaf never reached the backend or it errored.
    pub detail: Option<String>,
}

impl SolveReport {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a carve: fitted elevations aligned to the input node ordering
/// plus one report per leaf sub-problem.
#[derive(Debug, Clone)]
pub struct CarveOutcome {
    pub fitted: NodeAttrs,
    pub reports: Vec<SolveReport>,
}

/// Fit a quantile elevation profile along the network with the default
/// backend.
pub fn carve(net: &StreamNet, elev: &[f64], opts: &CarveOptions) -> CarveResult<CarveOutcome> {
    carve_with(&ClarabelSolver, net, elev, opts)
}

/// Fit a quantile elevation profile using a caller-supplied LP backend.
///
/// Inputs are validated up front and never mutated. A failed leaf solve
/// NaN-fills only its own nodes and records a failed report; sibling
/// sub-networks are unaffected.
pub fn carve_with<S: LpSolve + Sync>(
    solver: &S,
    net: &StreamNet,
    elev: &[f64],
    opts: &CarveOptions,
) -> CarveResult<CarveOutcome> {
    ensure_aligned(net, elev)?;
    ensure_all_finite(elev, "elevation").map_err(|e| CarveError::Validation {
        what: e.to_string(),
    })?;
    if !(opts.tau > 0.0 && opts.tau < 1.0) {
        return Err(CarveError::Validation {
            what: format!("tau must lie in (0, 1), got {}", opts.tau),
        });
    }
    if !(opts.min_gradient >= 0.0 && opts.min_gradient.is_finite()) {
        return Err(CarveError::Validation {
            what: format!("min_gradient must be >= 0, got {}", opts.min_gradient),
        });
    }

    let n = net.len();
    if n == 0 {
        return Ok(CarveOutcome {
            fitted: Vec::new(),
            reports: Vec::new(),
        });
    }

    let solve_plan = plan(net, opts.split)?;
    debug!(
        nodes = n,
        tasks = solve_plan.tasks.len(),
        tau = opts.tau,
        "carve starting"
    );

    let mut fitted = vec![f64::NAN; n];
    let mut reports: Vec<SolveReport> = Vec::with_capacity(solve_plan.tasks.len());

    // Wave 0: dependency-free tasks (trunks, or the single whole-network leaf).
    let wave: Vec<&SolveTask> = solve_plan
        .tasks
        .iter()
        .filter(|t| t.boundary.is_none())
        .collect();
    let results: Vec<(usize, LeafOutcome)> = wave
        .par_iter()
        .map(|t| (t.id, solve_leaf(solver, t, elev, opts, None)))
        .collect();
    for (id, out) in results {
        merge(&solve_plan.tasks[id], out, &mut fitted, &mut reports);
    }

    // Wave 1: tributaries, boundary values read from the merged trunks.
    let wave: Vec<(&SolveTask, f64)> = solve_plan
        .tasks
        .iter()
        .filter_map(|t| t.boundary.map(|b| (t, fitted[b.junction.idx()])))
        .collect();
    let results: Vec<(usize, LeafOutcome)> = wave
        .par_iter()
        .map(|(t, bc)| (t.id, solve_leaf(solver, t, elev, opts, Some(*bc))))
        .collect();
    for (id, out) in results {
        merge(&solve_plan.tasks[id], out, &mut fitted, &mut reports);
    }

    reports.sort_by_key(|r| r.task);
    Ok(CarveOutcome { fitted, reports })
}

struct LeafOutcome {
    /// Local fitted elevations on success.
    fit: Option<Vec<f64>>,
    report: SolveReport,
}

fn solve_leaf<S: LpSolve>(
    solver: &S,
    task: &SolveTask,
    elev: &[f64],
    opts: &CarveOptions,
    boundary: Option<f64>,
) -> LeafOutcome {
    let n = task.subnet.len();
    let mut local_elev = task.subnet.gather(elev);
    let mut params = ProfileParams {
        tau: opts.tau,
        min_gradient: opts.min_gradient,
        fixed_outlet: false,
    };

    if let (Some(bc), Some(b)) = (boundary, &task.boundary) {
        if !bc.is_finite() {
            warn!(task = task.id, "trunk boundary unavailable, skipping tributary");
            return failed_leaf(task, n, "trunk boundary unavailable");
        }
        let Some(junction) = task.subnet.local_of(b.junction) else {
            return failed_leaf(task, n, "junction missing from sub-network");
        };
        // The junction slot carries the trunk's fitted elevation, which the
        // pinned outlet row picks up as its boundary value.
        local_elev[junction.idx()] = bc;
        params.fixed_outlet = true;
    }

    let solved = build_profile_lp(task.subnet.net(), &local_elev, &params)
        .and_then(|p| solver.solve(&p, &opts.solver));

    match solved {
        Ok(sol) if sol.status.is_success() => {
            if sol.x.len() != 3 * n {
                return failed_leaf(task, n, "backend returned malformed solution");
            }
            LeafOutcome {
                fit: Some(fitted_block(&sol.x, n).to_vec()),
                report: SolveReport {
                    task: task.id,
                    label: task.label.clone(),
                    nodes: n,
                    status: sol.status,
                    iterations: sol.iterations,
                    objective: sol.objective,
                    solve_time: sol.solve_time,
                    detail: None,
                },
            }
        }
        Ok(sol) => {
            warn!(task = task.id, status = %sol.status, "leaf solve unsuccessful");
            LeafOutcome {
                fit: None,
                report: SolveReport {
                    task: task.id,
                    label: task.label.clone(),
                    nodes: n,
                    status: sol.status,
                    iterations: sol.iterations,
                    objective: f64::NAN,
                    solve_time: sol.solve_time,
                    detail: None,
                },
            }
        }
        Err(e) => {
            warn!(task = task.id, error = %e, "leaf solve failed");
            failed_leaf(task, n, &e.to_string())
        }
    }
}

fn failed_leaf(task: &SolveTask, n: usize, detail: &str) -> LeafOutcome {
    LeafOutcome {
        fit: None,
        report: SolveReport {
            task: task.id,
            label: task.label.clone(),
            nodes: n,
            status: SolveStatus::Failed,
            iterations: 0,
            objective: f64::NAN,
            solve_time: Duration::ZERO,
            detail: Some(detail.to_string()),
        },
    }
}

/// Scatter a leaf result into the output array at its owned positions.
///
/// A failed leaf leaves its nodes at the NaN they were initialized to.
fn merge(task: &SolveTask, out: LeafOutcome, fitted: &mut [f64], reports: &mut Vec<SolveReport>) {
    if let Some(fit) = out.fit {
        for (local, value) in fit.iter().enumerate() {
            let local = sc_core::NodeId::from_usize(local);
            if task.owns(local) {
                fitted[task.subnet.parent_of(local).idx()] = *value;
            }
        }
    }
    reports.push(out.report);
}
