//! End-to-end carve scenarios.

use sc_carve::{CarveError, CarveOptions, SplitMode, carve, carve_with};
use sc_core::{Tolerances, nearly_equal};
use sc_lp::{ClarabelSolver, LpError, LpProblem, LpResult, LpSolution, LpSolve, SolverOptions};
use sc_network::StreamNet;

/// Linear chain upstream-to-downstream; distances drop by 10 per edge.
fn chain(elev_len: usize) -> StreamNet {
    let receivers: Vec<Option<usize>> = (0..elev_len)
        .map(|i| (i + 1 < elev_len).then_some(i + 1))
        .collect();
    let distance: Vec<f64> = (0..elev_len)
        .map(|i| ((elev_len - 1 - i) * 10) as f64)
        .collect();
    StreamNet::from_receivers(&receivers, &distance).unwrap()
}

fn assert_descends(net: &StreamNet, fitted: &[f64], min_gradient: f64) {
    for (u, d) in net.edges() {
        let delta = net.distance(u) - net.distance(d);
        assert!(
            fitted[d.idx()] <= fitted[u.idx()] - min_gradient * delta + 1e-5,
            "edge {}->{} violates descent: {} -> {}",
            u,
            d,
            fitted[u.idx()],
            fitted[d.idx()]
        );
    }
}

#[test]
fn spike_is_pulled_onto_trend() {
    // Node 2 is a noisy spike between well-behaved neighbors.
    let net = chain(5);
    let elev = [100.0, 95.0, 110.0, 90.0, 85.0];
    let out = carve(&net, &elev, &CarveOptions::default()).unwrap();

    assert!(out.reports.iter().all(|r| r.is_success()));
    assert_descends(&net, &out.fitted, 0.0);

    // Endpoints and the node below the spike are uniquely determined.
    assert!((out.fitted[0] - 100.0).abs() < 1e-5);
    assert!((out.fitted[3] - 90.0).abs() < 1e-5);
    assert!((out.fitted[4] - 85.0).abs() < 1e-5);
    // The spike lands between its neighbors, well below the sample.
    assert!(out.fitted[2] <= 100.0 + 1e-5);
    assert!(out.fitted[2] >= 90.0 - 1e-5);
    assert!(out.fitted[2] < 105.0);
}

#[test]
fn clean_profile_passes_through() {
    let net = chain(4);
    let elev = [9.0, 8.0, 7.0, 6.0];
    let tol = Tolerances {
        abs: 1e-6,
        rel: 1e-9,
    };
    let out = carve(&net, &elev, &CarveOptions::default()).unwrap();
    for (f, e) in out.fitted.iter().zip(elev.iter()) {
        assert!(nearly_equal(*f, *e, tol), "expected pass-through, got {f} vs {e}");
    }
}

#[test]
fn lower_quantile_sits_below_upper() {
    let net = chain(6);
    let elev = [100.0, 102.0, 96.0, 99.0, 92.0, 90.0];

    let low = carve(
        &net,
        &elev,
        &CarveOptions {
            tau: 0.1,
            ..Default::default()
        },
    )
    .unwrap();
    let high = carve(
        &net,
        &elev,
        &CarveOptions {
            tau: 0.9,
            ..Default::default()
        },
    )
    .unwrap();

    for i in 0..net.len() {
        assert!(
            low.fitted[i] <= high.fitted[i] + 1e-4,
            "node {i}: tau=0.1 fit {} above tau=0.9 fit {}",
            low.fitted[i],
            high.fitted[i]
        );
    }
}

#[test]
fn min_gradient_shapes_the_whole_tree() {
    let net = StreamNet::from_receivers(
        &[Some(2), Some(2), Some(3), None],
        &[20.0, 25.0, 10.0, 0.0],
    )
    .unwrap();
    let elev = [50.0, 50.0, 50.0, 50.0];
    let opts = CarveOptions {
        min_gradient: 0.1,
        ..Default::default()
    };
    let out = carve(&net, &elev, &opts).unwrap();
    assert!(out.reports.iter().all(|r| r.is_success()));
    assert_descends(&net, &out.fitted, 0.1);
}

#[test]
fn tributary_outlet_uses_trunk_fit_not_raw_sample() {
    // Trunk 0 -> 1 -> 2 -> 3 with a spike at the junction (node 1); the
    // tributary (node 4) joins there. With tau = 0.3 the trunk fit at the
    // junction is 10, far from the raw sample of 50.
    let net = StreamNet::from_receivers(
        &[Some(1), Some(2), Some(3), None, Some(1)],
        &[30.0, 20.0, 10.0, 0.0, 25.0],
    )
    .unwrap();
    let elev = [10.0, 50.0, 6.0, 4.0, 9.0];
    let opts = CarveOptions {
        tau: 0.3,
        split: SplitMode::TrunkTributaries,
        ..Default::default()
    };
    let out = carve(&net, &elev, &opts).unwrap();

    assert!(out.reports.iter().all(|r| r.is_success()));
    assert!((out.fitted[1] - 10.0).abs() < 1e-4, "junction: {}", out.fitted[1]);
    // Pinned to the trunk's fitted 10, the tributary node rises to meet it.
    // Were the raw sample (50) used instead, it would land near 50.
    assert!(
        (out.fitted[4] - 10.0).abs() < 1e-4,
        "tributary got {}",
        out.fitted[4]
    );
}

#[test]
fn basin_split_matches_leaf_solve_on_clean_forest() {
    let net = StreamNet::from_receivers(
        &[Some(1), Some(2), None, Some(4), None],
        &[20.0, 10.0, 0.0, 10.0, 0.0],
    )
    .unwrap();
    let elev = [9.0, 8.0, 7.0, 5.0, 4.0];

    let split = carve(&net, &elev, &CarveOptions::default()).unwrap();
    let leaf = carve(
        &net,
        &elev,
        &CarveOptions {
            split: SplitMode::None,
            ..Default::default()
        },
    )
    .unwrap();

    for i in 0..net.len() {
        assert!(
            (split.fitted[i] - leaf.fitted[i]).abs() < 1e-6,
            "node {i}: {} vs {}",
            split.fitted[i],
            leaf.fitted[i]
        );
    }
    // Both reproduce the clean input.
    for (f, e) in split.fitted.iter().zip(elev.iter()) {
        assert!((f - e).abs() < 1e-6);
    }
}

#[test]
fn repeated_solves_are_identical() {
    let net = chain(5);
    let elev = [100.0, 95.0, 110.0, 90.0, 85.0];
    let a = carve(&net, &elev, &CarveOptions::default()).unwrap();
    let b = carve(&net, &elev, &CarveOptions::default()).unwrap();
    assert_eq!(a.fitted, b.fitted);
}

#[test]
fn nan_elevation_is_rejected_up_front() {
    let net = chain(3);
    let err = carve(&net, &[9.0, f64::NAN, 7.0], &CarveOptions::default()).unwrap_err();
    assert!(matches!(err, CarveError::Validation { .. }));
}

#[test]
fn misaligned_elevation_is_rejected() {
    let net = chain(3);
    let err = carve(&net, &[9.0, 8.0], &CarveOptions::default()).unwrap_err();
    assert!(matches!(err, CarveError::Net(_)));
}

#[test]
fn tau_outside_unit_interval_is_rejected() {
    let net = chain(2);
    for tau in [0.0, 1.0, -1.0, 2.0] {
        let err = carve(
            &net,
            &[2.0, 1.0],
            &CarveOptions {
                tau,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CarveError::Validation { .. }), "tau={tau}");
    }
}

/// Backend that refuses problems of one particular size and delegates the
/// rest, for exercising localized failure.
struct FailOn {
    nodes: usize,
    inner: ClarabelSolver,
}

impl LpSolve for FailOn {
    fn solve(&self, problem: &LpProblem, opts: &SolverOptions) -> LpResult<LpSolution> {
        if problem.num_vars() == 3 * self.nodes {
            return Err(LpError::Backend {
                what: "injected failure".to_string(),
            });
        }
        self.inner.solve(problem, opts)
    }
}

#[test]
fn failed_basin_does_not_poison_siblings() {
    // Basin A: 0 -> 1 -> 2 (3 nodes). Basin B: 3 -> 4 (2 nodes).
    let net = StreamNet::from_receivers(
        &[Some(1), Some(2), None, Some(4), None],
        &[20.0, 10.0, 0.0, 10.0, 0.0],
    )
    .unwrap();
    let elev = [9.0, 8.0, 7.0, 5.0, 4.0];
    let solver = FailOn {
        nodes: 3,
        inner: ClarabelSolver,
    };

    let out = carve_with(&solver, &net, &elev, &CarveOptions::default()).unwrap();

    // Basin A is NaN-filled, basin B is fitted.
    for i in 0..3 {
        assert!(out.fitted[i].is_nan(), "node {i} should be NaN");
    }
    for i in 3..5 {
        assert!((out.fitted[i] - elev[i]).abs() < 1e-6);
    }
    assert_eq!(out.reports.len(), 2);
    assert_eq!(out.reports.iter().filter(|r| !r.is_success()).count(), 1);
    let failed = out.reports.iter().find(|r| !r.is_success()).unwrap();
    assert!(failed.detail.as_deref().unwrap_or("").contains("injected"));
}

#[test]
fn failed_trunk_skips_its_tributaries() {
    // Single basin: trunk 0 -> 1 -> 4 -> 5 (4 nodes) with two 1-node
    // tributaries. Failing the 4-node problem starves the tributaries of
    // their boundary values.
    let net = StreamNet::from_receivers(
        &[Some(1), Some(4), Some(1), Some(4), Some(5), None],
        &[30.0, 20.0, 28.0, 12.0, 10.0, 0.0],
    )
    .unwrap();
    let elev = [20.0, 15.0, 18.0, 9.0, 8.0, 5.0];
    let solver = FailOn {
        nodes: 4,
        inner: ClarabelSolver,
    };
    let opts = CarveOptions {
        split: SplitMode::TrunkTributaries,
        ..Default::default()
    };

    let out = carve_with(&solver, &net, &elev, &opts).unwrap();

    assert!(out.fitted.iter().all(|v| v.is_nan()));
    assert_eq!(out.reports.len(), 3);
    assert!(out.reports.iter().all(|r| !r.is_success()));
    // The tributaries report the starved boundary, not a solver error.
    let starved = out
        .reports
        .iter()
        .filter(|r| {
            r.detail
                .as_deref()
                .is_some_and(|d| d.contains("boundary unavailable"))
        })
        .count();
    assert_eq!(starved, 2);
}

#[test]
fn empty_network_yields_empty_outcome() {
    let net = StreamNet::from_receivers(&[], &[]).unwrap();
    let out = carve(&net, &[], &CarveOptions::default()).unwrap();
    assert!(out.fitted.is_empty());
    assert!(out.reports.is_empty());
}
