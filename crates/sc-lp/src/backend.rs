//! Clarabel-backed LP solver.
//!
//! The profile LP is dispatched as a conic program: equality rows in the
//! zero cone, inequality and finite-bound rows in the nonnegative cone,
//! zero quadratic term.

use std::time::Instant;

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use tracing::debug;

use crate::error::{LpError, LpResult};
use crate::problem::LpProblem;
use crate::solver::{LpSolution, LpSolve, SolveStatus, SolverOptions};

/// Default production backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClarabelSolver;

impl LpSolve for ClarabelSolver {
    fn solve(&self, problem: &LpProblem, opts: &SolverOptions) -> LpResult<LpSolution> {
        let n_var = problem.num_vars();
        let n_eq = problem.equalities.rows;
        let n_ub = problem.inequalities.rows;

        // Column-wise accumulation; row order is equalities, then
        // inequalities, then finite-bound rows.
        let mut cols: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n_var];
        for &(r, c, v) in &problem.equalities.entries {
            cols[c].push((r, v));
        }
        for &(r, c, v) in &problem.inequalities.entries {
            cols[c].push((n_eq + r, v));
        }

        let mut b = Vec::with_capacity(n_eq + n_ub);
        b.extend_from_slice(&problem.equalities.rhs);
        b.extend_from_slice(&problem.inequalities.rhs);

        let mut row = n_eq + n_ub;
        for (j, &(lb, ub)) in problem.bounds.iter().enumerate() {
            if lb.is_finite() {
                // x >= lb  ->  -x <= -lb
                cols[j].push((row, -1.0));
                b.push(-lb);
                row += 1;
            }
            if ub.is_finite() {
                cols[j].push((row, 1.0));
                b.push(ub);
                row += 1;
            }
        }
        let n_rows = row;
        let n_ineq = n_rows - n_eq;

        // CSC conversion: sort each column by row index and concatenate.
        let mut col_ptr = Vec::with_capacity(n_var + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        let mut nnz = 0;
        for col in cols.iter_mut() {
            col_ptr.push(nnz);
            col.sort_by_key(|(r, _)| *r);
            for &(r, v) in col.iter() {
                row_idx.push(r);
                values.push(v);
                nnz += 1;
            }
        }
        col_ptr.push(nnz);

        let a_mat = CscMatrix::new(n_rows, n_var, col_ptr, row_idx, values);
        // Zero quadratic term: a pure LP in conic form.
        let p_mat = CscMatrix::new(n_var, n_var, vec![0; n_var + 1], Vec::new(), Vec::new());

        let mut cones = Vec::new();
        if n_eq > 0 {
            cones.push(SupportedConeT::ZeroConeT(n_eq));
        }
        if n_ineq > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(n_ineq));
        }

        let settings = DefaultSettingsBuilder::default()
            .verbose(opts.verbose)
            .max_iter(opts.max_iter)
            .build()
            .map_err(|e| LpError::Backend {
                what: format!("settings: {e:?}"),
            })?;

        debug!(vars = n_var, eq = n_eq, ineq = n_ineq, "dispatching LP");

        let start = Instant::now();
        let mut solver = DefaultSolver::new(&p_mat, &problem.objective, &a_mat, &b, &cones, settings)
            .map_err(|e| LpError::Backend {
                what: format!("setup: {e:?}"),
            })?;
        solver.solve();
        let elapsed = start.elapsed();

        let sol = solver.solution;
        let status = match sol.status {
            SolverStatus::Solved => SolveStatus::Optimal,
            SolverStatus::AlmostSolved => SolveStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible
            | SolverStatus::AlmostPrimalInfeasible
            | SolverStatus::DualInfeasible
            | SolverStatus::AlmostDualInfeasible => SolveStatus::Infeasible,
            SolverStatus::MaxIterations | SolverStatus::MaxTime => SolveStatus::IterationLimit,
            _ => SolveStatus::Failed,
        };

        Ok(LpSolution {
            x: sol.x,
            status,
            iterations: sol.iterations,
            objective: sol.obj_val,
            solve_time: elapsed,
        })
    }
}
