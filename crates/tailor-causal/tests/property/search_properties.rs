//! Property tests for search and orientation: T1-SEARCH-10 through T1-SEARCH-13.

use std::sync::Arc;

use proptest::prelude::*;

use tailor_causal::graph::dag_enforcement::is_acyclic;
use tailor_causal::graph::{dag_from_cpdag, Endpoint, EndpointGraph};
use tailor_causal::independence::DSeparationTest;
use tailor_causal::orient::IsGfci;
use tailor_causal::score::IsScore;
use tailor_causal::search::subsets::{all_subsets, difference_sorted, is_subset_sorted, subsets_of_size, union_sorted};
use tailor_causal::search::{EditKind, IsFges};
use tailor_core::config::{OrientConfig, ScoreConfig, SearchConfig};
use tailor_core::data::{Dataset, TestInstance, Variable};
use tailor_core::knowledge::Knowledge;
use tailor_core::traits::CancellationToken;

const VARS: usize = 4;

fn build_dataset(rows: &[Vec<i32>]) -> Arc<Dataset> {
    let variables = (0..VARS)
        .map(|i| Variable::with_arity(format!("V{i}"), 2).unwrap())
        .collect();
    Arc::new(Dataset::from_rows(variables, rows).unwrap())
}

/// Rows where each variable copies an earlier one with some probability,
/// so searches see a mix of dependent and independent pairs.
fn rows_strategy() -> impl Strategy<Value = Vec<Vec<i32>>> {
    prop::collection::vec(
        (prop::collection::vec(0..2i32, VARS), prop::collection::vec(any::<bool>(), VARS)),
        30..150,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(mut row, copy)| {
                for v in 1..VARS {
                    if copy[v] {
                        row[v] = row[v - 1];
                    }
                }
                row
            })
            .collect()
    })
}

/// Random DAG over `n` nodes: edges only from lower to higher index.
fn random_dag(n: usize, mask: &[bool]) -> EndpointGraph {
    let names: Vec<String> = (0..n).map(|i| format!("V{i}")).collect();
    let mut dag = EndpointGraph::new(names);
    let mut bit = 0;
    for a in 0..n {
        for b in a + 1..n {
            if mask[bit] {
                dag.add_directed(a, b);
            }
            bit += 1;
        }
    }
    dag
}

fn sorted_set(values: Vec<usize>) -> Vec<usize> {
    let mut values = values;
    values.sort_unstable();
    values.dedup();
    values
}

// =============================================================================
// T1-SEARCH-10: Property test: search output is a consistent CPDAG
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn t1_search_10_output_is_cpdag(rows in rows_strategy()) {
        let data = build_dataset(&rows);
        let instance = TestInstance::new(&data, data.row(0)).unwrap();
        let score = IsScore::new(Arc::clone(&data), instance, &ScoreConfig::default()).unwrap();
        let fges = IsFges::new(&score, &SearchConfig::default()).unwrap();
        let result = fges.search(&CancellationToken::new()).value;

        let mut previous = fges.working_score(&result.graph.empty_like());
        for step in &result.trace {
            match step.kind {
                EditKind::Insert => prop_assert!(step.bump > 0.0, "{:?}", step),
                EditKind::Delete => prop_assert!(step.bump >= 0.0, "{:?}", step),
            }
            prop_assert!(step.score >= previous - 1e-9 * previous.abs().max(1.0), "{:?}", step);
            previous = step.score;
        }
        prop_assert!((fges.working_score(&result.dag) - result.score).abs() <= 1e-9 * result.score.abs().max(1.0));
        prop_assert!(result.dag.is_fully_directed());
        for edge in result.graph.edges() {
            prop_assert!(result.dag.is_adjacent(edge.a, edge.b));
            if result.graph.is_directed(edge.a, edge.b) {
                prop_assert!(result.dag.is_directed(edge.a, edge.b));
            }
            if result.graph.is_directed(edge.b, edge.a) {
                prop_assert!(result.dag.is_directed(edge.b, edge.a));
            }
        }
        for edge in result.graph.edges() {
            prop_assert!(edge.at_a != Endpoint::Circle && edge.at_b != Endpoint::Circle);
        }
        prop_assert!(is_acyclic(&result.graph));
        let dag = dag_from_cpdag(&result.graph).unwrap();
        prop_assert!(is_acyclic(&dag));
        prop_assert_eq!(dag.num_edges(), result.graph.num_edges());
    }
}

// =============================================================================
// T1-SEARCH-11: Property test: forbidden orientations never appear
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn t1_search_11_forbidden_never_oriented(
        rows in rows_strategy(),
        from in 0..VARS,
        to in 0..VARS,
    ) {
        prop_assume!(from != to);
        let data = build_dataset(&rows);
        let names = data.names();
        let mut knowledge = Knowledge::new();
        knowledge.set_forbidden(&names[from], &names[to]);

        let instance = TestInstance::new(&data, data.row(0)).unwrap();
        let score = IsScore::new(Arc::clone(&data), instance, &ScoreConfig::default()).unwrap();
        let fges = IsFges::new(&score, &SearchConfig::default())
            .unwrap()
            .with_knowledge(knowledge);
        let result = fges.search(&CancellationToken::new()).value;
        prop_assert!(!result.graph.is_directed(from, to), "{}", result.graph);
    }
}

// =============================================================================
// T1-SEARCH-12: Property test: orientation under a d-separation oracle
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn t1_search_12_pag_respects_knowledge(
        mask in prop::collection::vec(any::<bool>(), 10),
        from in 0usize..5,
        to in 0usize..5,
    ) {
        prop_assume!(from != to);
        let dag = random_dag(5, &mask);
        let oracle = DSeparationTest::new(dag.clone()).unwrap();
        // The true skeleton as an undirected backbone.
        let mut backbone = dag.empty_like();
        for edge in dag.edges() {
            backbone.add_undirected(edge.a, edge.b);
        }

        let mut knowledge = Knowledge::new();
        knowledge.set_forbidden(dag.name(from), dag.name(to));
        let gfci = IsGfci::new(&oracle, &OrientConfig { complete_rule_set: true, ..OrientConfig::default() })
            .unwrap()
            .with_knowledge(knowledge);
        let outcome = gfci.orient(&backbone, &CancellationToken::new()).unwrap();
        prop_assert!(!outcome.cancelled);
        let pag = outcome.value;
        prop_assert!(!pag.is_directed(from, to), "{}", pag);
        for edge in pag.edges() {
            prop_assert!(backbone.is_adjacent(edge.a, edge.b));
        }
    }
}

// =============================================================================
// T1-SEARCH-13: Property test: subset helpers
// =============================================================================
proptest! {
    #[test]
    fn t1_search_13_subset_helpers(
        items in prop::collection::vec(0usize..40, 0..8),
        other in prop::collection::vec(0usize..40, 0..8),
        k in 0usize..9,
    ) {
        let items = sorted_set(items);
        let other = sorted_set(other);

        let of_size: Vec<Vec<usize>> = subsets_of_size(&items, k).collect();
        let expected = if k > items.len() {
            0
        } else {
            (0..k).fold(1usize, |acc, i| acc * (items.len() - i) / (i + 1))
        };
        prop_assert_eq!(of_size.len(), expected);
        for subset in &of_size {
            prop_assert_eq!(subset.len(), k);
            prop_assert!(is_subset_sorted(subset, &items));
        }
        prop_assert_eq!(all_subsets(&items).count(), 1usize << items.len());

        let union = union_sorted(&items, &other);
        prop_assert_eq!(&union, &sorted_set(items.iter().chain(&other).copied().collect()));
        let diff = difference_sorted(&union, &other);
        prop_assert!(diff.iter().all(|v| items.contains(v) && !other.contains(v)));
        prop_assert!(is_subset_sorted(&items, &union));
    }
}
