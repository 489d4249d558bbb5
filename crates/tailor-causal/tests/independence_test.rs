//! Tests for the independence oracles: T1-IND-01 through T1-IND-07.

use std::sync::Arc;

use tailor_causal::graph::EndpointGraph;
use tailor_causal::independence::{DSeparationTest, IndependenceTest, ProbabilisticTest};
use tailor_core::config::{OracleConfig, SplitOrder};
use test_fixtures::{chain, deterministic_pair, independent_uniform, instance_from_row};

fn threshold_oracle(data: &Arc<tailor_core::data::Dataset>) -> ProbabilisticTest {
    ProbabilisticTest::new(Arc::clone(data), 1.0, &OracleConfig::default()).unwrap()
}

// =============================================================================
// T1-IND-01: A deterministic relationship is dependent
// =============================================================================
#[test]
fn t1_ind_01_deterministic_pair_is_dependent() {
    for arity in [2, 4] {
        let data = deterministic_pair(20, arity);
        let oracle = threshold_oracle(&data);
        let p = oracle.probability_independent(0, 1, &[]);
        assert!(p < 0.05, "arity {arity}: p = {p}");
        assert!(!oracle.is_independent(0, 1, &[]));
    }
}

// =============================================================================
// T1-IND-02: Independent uniform variables are independent
// =============================================================================
#[test]
fn t1_ind_02_uniform_variables_are_independent() {
    let data = independent_uniform(400, 3, 4, 11);
    let oracle = threshold_oracle(&data);
    let p = oracle.probability_independent(0, 1, &[]);
    assert!(p > 0.9, "p = {p}");
    let p = oracle.probability_independent(0, 1, &[2]);
    assert!(p > 0.9, "p = {p}");
    assert!(oracle.is_independent(1, 2, &[0]));
}

// =============================================================================
// T1-IND-03: Queries are memoized on (x, y, sorted z)
// =============================================================================
#[test]
fn t1_ind_03_memoization() {
    let data = independent_uniform(100, 4, 2, 3);
    let oracle = threshold_oracle(&data);
    assert_eq!(oracle.memo_len(), 0);
    let first = oracle.probability_independent(0, 1, &[2, 3]);
    let again = oracle.probability_independent(0, 1, &[3, 2]);
    assert_eq!(first, again);
    assert_eq!(oracle.memo_len(), 1);
    oracle.is_independent(0, 1, &[2]);
    assert_eq!(oracle.memo_len(), 2);

    let bounded = ProbabilisticTest::new(
        Arc::clone(&data),
        1.0,
        &OracleConfig {
            cache_capacity: 1,
            ..OracleConfig::default()
        },
    )
    .unwrap();
    bounded.is_independent(0, 1, &[]);
    bounded.is_independent(0, 2, &[]);
    bounded.is_independent(0, 3, &[]);
    assert_eq!(bounded.memo_len(), 1);
}

// =============================================================================
// T1-IND-04: Bernoulli decisions are reproducible under a seed
// =============================================================================
#[test]
fn t1_ind_04_seeded_bernoulli() {
    let data = chain(300, 0.3, 9);
    let config = OracleConfig {
        threshold: false,
        seed: Some(42),
        ..OracleConfig::default()
    };
    let queries: [(usize, usize, &[usize]); 5] = [(0, 1, &[]), (0, 2, &[]), (0, 2, &[1]), (1, 2, &[0]), (0, 1, &[2])];
    let run = || {
        let oracle = ProbabilisticTest::new(Arc::clone(&data), 1.0, &config).unwrap();
        queries
            .iter()
            .map(|(x, y, z)| oracle.is_independent(*x, *y, z))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());

    let pair = deterministic_pair(40, 2);
    let oracle = ProbabilisticTest::new(pair, 1.0, &config).unwrap();
    assert!(!oracle.is_independent(0, 1, &[]));
}

// =============================================================================
// T1-IND-05: Instance-specific updates in either order
// =============================================================================
#[test]
fn t1_ind_05_split_orders_agree() {
    let data = chain(500, 0.1, 4);
    let instance = instance_from_row(&data, 0);
    let posterior = |order: SplitOrder| {
        let config = OracleConfig {
            split_order: order,
            ..OracleConfig::default()
        };
        ProbabilisticTest::new(Arc::clone(&data), 1.0, &config)
            .unwrap()
            .with_instance(instance.clone())
            .probability_independent(0, 2, &[1])
    };
    let instance_first = posterior(SplitOrder::InstanceFirst);
    let population_first = posterior(SplitOrder::PopulationFirst);
    assert!(instance_first > 0.5, "p = {instance_first}");
    // Odds multiply, so the order only changes rounding.
    assert!((instance_first - population_first).abs() < 1e-9);

    let population_only = ProbabilisticTest::new(
        Arc::clone(&data),
        1.0,
        &OracleConfig {
            instance_specific: false,
            ..OracleConfig::default()
        },
    )
    .unwrap()
    .with_instance(instance);
    let p = population_only.probability_independent(0, 2, &[1]);
    assert!(p > 0.5 && p < 1.0, "p = {p}");
    assert!(population_only.probability_independent(0, 1, &[]) < 0.05);
}

// =============================================================================
// T1-IND-06: d-separation oracle
// =============================================================================
#[test]
fn t1_ind_06_dseparation_oracle() {
    let dag = EndpointGraph::from_directed(&["A", "B", "C"], &[("A", "B"), ("B", "C")]).unwrap();
    let oracle = DSeparationTest::new(dag).unwrap();
    assert_eq!(oracle.names(), ["A", "B", "C"]);
    assert_eq!(oracle.node_index("C"), Some(2));
    assert!(!oracle.is_independent(0, 2, &[]));
    assert!(oracle.is_independent(0, 2, &[1]));

    let cyclic =
        EndpointGraph::from_directed(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]).unwrap();
    assert!(DSeparationTest::new(cyclic).is_err());

    let mut undirected = EndpointGraph::new(vec!["A".into(), "B".into()]);
    undirected.add_undirected(0, 1);
    assert!(DSeparationTest::new(undirected).is_err());
}

// =============================================================================
// T1-IND-07: Invalid oracle settings are rejected
// =============================================================================
#[test]
fn t1_ind_07_invalid_settings() {
    let data = deterministic_pair(10, 2);
    let bad_prior = OracleConfig {
        prior: 1.0,
        ..OracleConfig::default()
    };
    assert!(ProbabilisticTest::new(Arc::clone(&data), 1.0, &bad_prior).is_err());
    let bad_cutoff = OracleConfig {
        cutoff: 1.5,
        ..OracleConfig::default()
    };
    assert!(ProbabilisticTest::new(Arc::clone(&data), 1.0, &bad_cutoff).is_err());
    assert!(ProbabilisticTest::new(data, 0.0, &OracleConfig::default()).is_err());
}
