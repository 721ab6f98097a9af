//! Constraint assembly for the quantile profile LP.
//!
//! For an n-node sub-network the decision vector is laid out in three
//! blocks of n: positive residuals, negative residuals, fitted elevations.
//!
//! ```text
//! x = [ r+[0..n] | r-[0..n] | z[0..n] ]
//! ```
//!
//! - objective: tau on r+, (1 - tau) on r-, zero on z
//! - equality per node i: r+[i] - r-[i] + z[i] = elev[i]
//! - inequality per edge (u -> d): (z[d] - z[u]) / delta <= -min_gradient,
//!   delta = distance(u) - distance(d) > 0
//! - bounds: residuals >= 0, z free
//!
//! With `fixed_outlet` the outlet's equality row is replaced by
//! `z[outlet] = elev[outlet]` (the caller writes the boundary value into
//! that elevation slot) and the z bound is pinned to the same value, so the
//! outlet drops out of the residual fit while gradient rows of its donors
//! still reference its fitted elevation.

use sc_core::ensure_all_finite;
use sc_network::StreamNet;

use crate::error::{LpError, LpResult};
use crate::problem::{LpProblem, SparseSystem};

/// Parameters of the profile fit.
#[derive(Debug, Clone, Copy)]
pub struct ProfileParams {
    /// Target quantile, exclusive (0, 1).
    pub tau: f64,
    /// Minimum downward gradient per unit channel distance (>= 0).
    pub min_gradient: f64,
    /// Pin the outlet's fitted elevation to its elevation slot instead of
    /// fitting it.
    pub fixed_outlet: bool,
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            tau: 0.5,
            min_gradient: 0.0,
            fixed_outlet: false,
        }
    }
}

/// The fitted-elevation block of a solution vector for an n-node problem.
pub fn fitted_block(x: &[f64], n: usize) -> &[f64] {
    &x[2 * n..3 * n]
}

/// Build the quantile profile LP for one sub-network.
///
/// Fails fast on misaligned or non-finite elevations, tau outside (0, 1),
/// negative minimum gradient, or a fixed outlet on a multi-outlet network.
/// No LP data is assembled if validation fails.
pub fn build_profile_lp(
    net: &StreamNet,
    elev: &[f64],
    params: &ProfileParams,
) -> LpResult<LpProblem> {
    let n = net.len();

    if elev.len() != n {
        return Err(LpError::Validation {
            what: format!("elevation length {} does not match {} nodes", elev.len(), n),
        });
    }
    ensure_all_finite(elev, "elevation").map_err(|e| LpError::Validation {
        what: e.to_string(),
    })?;
    if !(params.tau > 0.0 && params.tau < 1.0) {
        return Err(LpError::Validation {
            what: format!("tau must lie in (0, 1), got {}", params.tau),
        });
    }
    if !(params.min_gradient >= 0.0 && params.min_gradient.is_finite()) {
        return Err(LpError::Validation {
            what: format!("min_gradient must be >= 0, got {}", params.min_gradient),
        });
    }
    let fixed = if params.fixed_outlet {
        if net.outlets().len() != 1 {
            return Err(LpError::Validation {
                what: format!(
                    "fixed outlet requires exactly one outlet, network has {}",
                    net.outlets().len()
                ),
            });
        }
        Some(net.outlets()[0].idx())
    } else {
        None
    };

    // Block offsets into the decision vector.
    let pos = |i: usize| i;
    let neg = |i: usize| n + i;
    let fit = |i: usize| 2 * n + i;

    let mut objective = vec![0.0; 3 * n];
    for i in 0..n {
        objective[pos(i)] = params.tau;
        objective[neg(i)] = 1.0 - params.tau;
    }

    let mut equalities = SparseSystem::new(3 * n);
    for i in 0..n {
        if fixed == Some(i) {
            // Residual coupling zeroed: the row pins z directly.
            equalities.push_row(&[(fit(i), 1.0)], elev[i]);
        } else {
            equalities.push_row(&[(pos(i), 1.0), (neg(i), -1.0), (fit(i), 1.0)], elev[i]);
        }
    }

    let mut inequalities = SparseSystem::new(3 * n);
    for (u, d) in net.edges() {
        // Strictly positive by network validation.
        let delta = net.distance(u) - net.distance(d);
        inequalities.push_row(
            &[(fit(d.idx()), 1.0 / delta), (fit(u.idx()), -1.0 / delta)],
            -params.min_gradient,
        );
    }

    let mut bounds = Vec::with_capacity(3 * n);
    bounds.extend(std::iter::repeat_n((0.0, f64::INFINITY), 2 * n));
    bounds.extend(std::iter::repeat_n((f64::NEG_INFINITY, f64::INFINITY), n));
    if let Some(o) = fixed {
        bounds[fit(o)] = (elev[o], elev[o]);
    }

    Ok(LpProblem {
        objective,
        equalities,
        inequalities,
        bounds,
    })
}
