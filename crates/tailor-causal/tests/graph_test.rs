//! Tests for the endpoint graph and its path queries: T1-GRAPH-01 through T1-GRAPH-06.

use tailor_causal::graph::dag_enforcement::{find_cycles, would_create_cycle};
use tailor_causal::graph::paths::{exists_semi_directed_path, is_d_separated, unconditionally_d_connected};
use tailor_causal::graph::{dag_from_cpdag, violates_knowledge, Endpoint, EndpointGraph, MeekRules};
use tailor_core::knowledge::Knowledge;

fn graph(names: &[&str]) -> EndpointGraph {
    EndpointGraph::new(names.iter().map(|s| s.to_string()).collect())
}

// =============================================================================
// T1-GRAPH-01: Marks, rendering and parsing agree
// =============================================================================
#[test]
fn t1_graph_01_marks_and_rendering() {
    let mut g = graph(&["A", "B", "C", "D"]);
    g.add_directed(1, 0);
    g.add_edge(1, 2, Endpoint::Circle, Endpoint::Arrow);
    g.add_edge(2, 3, Endpoint::Arrow, Endpoint::Arrow);
    g.add_undirected(0, 3);

    assert_eq!(g.num_edges(), 4);
    assert_eq!(g.endpoint(1, 0), Some(Endpoint::Arrow));
    assert_eq!(g.endpoint(0, 1), Some(Endpoint::Tail));
    assert_eq!(
        g.edge_strings(),
        vec!["A <-- B", "A --- D", "B o-> C", "C <-> D"]
    );
    assert!(g.has_edge_str("B --> A"));
    assert!(g.has_edge_str("C <-o B"));
    assert!(g.has_edge_str("D <-> C"));
    assert!(!g.has_edge_str("A --> B"));
    assert!(!g.has_edge_str("A --> Z"));
    assert!(g.is_def_collider(1, 2, 3));

    let snapshot = serde_json::to_value(g.snapshot()).unwrap();
    assert_eq!(snapshot["edges"][2], "B o-> C");
}

#[test]
fn t1_graph_01b_edits() {
    let mut g = graph(&["A", "B"]);
    assert!(!g.set_endpoint(0, 1, Endpoint::Arrow));
    g.add_undirected(0, 1);
    g.reorient_all(Endpoint::Circle);
    assert!(g.has_edge_str("A o-o B"));
    assert!(g.remove_edge(1, 0));
    assert!(!g.is_adjacent(0, 1));
    assert!(g.require("Z").is_err());
}

// =============================================================================
// T1-GRAPH-02: Cycle checks on the directed part
// =============================================================================
#[test]
fn t1_graph_02_cycles() {
    let mut g = EndpointGraph::from_directed(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C")]).unwrap();
    g.add_undirected(2, 3);
    assert!(would_create_cycle(&g, 2, 0));
    assert!(!would_create_cycle(&g, 3, 0));
    assert!(g.is_ancestor_of(0, 2));
    assert!(!g.is_ancestor_of(0, 3));
    g.add_directed(2, 0);
    assert_eq!(find_cycles(&g), vec![vec![0, 1, 2]]);
}

// =============================================================================
// T1-GRAPH-03: Meek rules keep colliders and propagate away from them
// =============================================================================
#[test]
fn t1_graph_03_meek_closure() {
    let mut g = EndpointGraph::from_directed(
        &["A", "B", "C", "D"],
        &[("A", "C"), ("B", "C"), ("C", "D")],
    )
    .unwrap();
    let k = Knowledge::new();
    MeekRules::new(&k).orient_implied(&mut g);
    assert!(g.has_edge_str("A --> C"));
    assert!(g.has_edge_str("B --> C"));
    assert!(g.has_edge_str("C --> D"));

    let mut chain = EndpointGraph::from_directed(&["A", "B", "C"], &[("A", "B"), ("B", "C")]).unwrap();
    let mut required = Knowledge::new();
    required.set_required("B", "A");
    MeekRules::new(&required).orient_implied(&mut chain);
    assert!(chain.has_edge_str("B --> A"));
    assert!(chain.has_edge_str("B --- C"));
}

// =============================================================================
// T1-GRAPH-04: CPDAG extension and knowledge checks
// =============================================================================
#[test]
fn t1_graph_04_extension_and_knowledge() {
    let mut cpdag = graph(&["A", "B", "C"]);
    cpdag.add_undirected(0, 1);
    cpdag.add_undirected(1, 2);
    let dag = dag_from_cpdag(&cpdag).unwrap();
    assert!(dag.is_fully_directed());
    assert_eq!(dag.num_edges(), 2);
    // No new collider at B.
    assert!(!(dag.is_directed(0, 1) && dag.is_directed(2, 1)));

    let mut k = Knowledge::new();
    k.set_tier(0, &["B"]);
    k.set_tier(1, &["A", "C"]);
    let ok = EndpointGraph::from_directed(&["A", "B", "C"], &[("B", "A"), ("B", "C")]).unwrap();
    assert!(!violates_knowledge(&ok, &k));
    let bad = EndpointGraph::from_directed(&["A", "B", "C"], &[("A", "B"), ("B", "C")]).unwrap();
    assert!(violates_knowledge(&bad, &k));
}

// =============================================================================
// T1-GRAPH-05: d-separation
// =============================================================================
#[test]
fn t1_graph_05_d_separation() {
    // A -> B -> C, A -> D <- C
    let dag = EndpointGraph::from_directed(
        &["A", "B", "C", "D"],
        &[("A", "B"), ("B", "C"), ("A", "D"), ("C", "D")],
    )
    .unwrap();
    assert!(!is_d_separated(&dag, 0, 2, &[]));
    assert!(is_d_separated(&dag, 0, 2, &[1]));
    assert!(!is_d_separated(&dag, 0, 2, &[1, 3]));
    assert!(is_d_separated(&dag, 1, 3, &[0, 2]));
    assert!(!is_d_separated(&dag, 1, 3, &[0]));

    let collider = EndpointGraph::from_directed(&["X", "Y", "Z", "W"], &[("X", "Z"), ("Y", "Z"), ("Z", "W")]).unwrap();
    assert!(is_d_separated(&collider, 0, 1, &[]));
    assert!(!is_d_separated(&collider, 0, 1, &[2]));
    assert!(!is_d_separated(&collider, 0, 1, &[3]));
}

// =============================================================================
// T1-GRAPH-06: Reachability used by the search
// =============================================================================
#[test]
fn t1_graph_06_reachability() {
    let collider = EndpointGraph::from_directed(&["X", "Y", "Z"], &[("X", "Z"), ("Y", "Z")]).unwrap();
    let reach = unconditionally_d_connected(&collider, 0);
    assert!(reach.contains(&2));
    assert!(!reach.contains(&1));

    let mut g = graph(&["A", "B", "C"]);
    g.add_directed(0, 1);
    g.add_undirected(1, 2);
    assert!(exists_semi_directed_path(&g, 0, 2, &[], 3));
    assert!(!exists_semi_directed_path(&g, 2, 0, &[], 3));
    assert!(!exists_semi_directed_path(&g, 0, 2, &[1], 3));
}
