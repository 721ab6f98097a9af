//! Solver interface: options, status, solution, and the backend trait.

use core::fmt;
use std::time::Duration;

use crate::error::LpResult;
use crate::problem::LpProblem;

/// Per-call solver configuration.
///
/// Verbosity is deliberately an option here rather than process-wide state:
/// every invocation decides for itself whether the backend prints progress.
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    /// Let the backend print iteration progress.
    pub verbose: bool,
    /// Iteration cap handed to the backend.
    pub max_iter: u32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            max_iter: 200,
        }
    }
}

/// Outcome class of one LP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Converged to optimality.
    Optimal,
    /// Converged under relaxed tolerances.
    AlmostOptimal,
    /// Problem reported primal or dual infeasible.
    Infeasible,
    /// Iteration or time cap hit before convergence.
    IterationLimit,
    /// Backend gave up (numerical trouble) or never produced a solution.
    Failed,
}

impl SolveStatus {
    /// Whether the solution vector is usable.
    pub fn is_success(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::AlmostOptimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::AlmostOptimal => "almost-optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::IterationLimit => "iteration-limit",
            SolveStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Solution of one LP plus solver diagnostics.
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Primal solution in the problem's variable layout.
    pub x: Vec<f64>,
    pub status: SolveStatus,
    pub iterations: u32,
    /// Objective value at `x` (meaningful only on success).
    pub objective: f64,
    pub solve_time: Duration,
}

/// A black-box LP solver.
///
/// `Ok` with a non-success status reports a well-formed but unusable solve
/// (infeasible, iteration cap); `Err` is reserved for backend setup
/// failures. Callers treat both as a localized failure of the sub-problem.
pub trait LpSolve {
    fn solve(&self, problem: &LpProblem, opts: &SolverOptions) -> LpResult<LpSolution>;
}
