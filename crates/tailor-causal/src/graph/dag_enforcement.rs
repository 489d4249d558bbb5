//! Cycle checks on the directed part of an [`EndpointGraph`].
//!
//! The directed edges are projected into a petgraph `DiGraph` whose node
//! indices equal the endpoint-graph indices.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use super::endpoint_graph::EndpointGraph;

/// Directed edges of `graph` as a petgraph digraph.
pub fn directed_projection(graph: &EndpointGraph) -> DiGraph<usize, ()> {
    let mut dg = DiGraph::with_capacity(graph.num_nodes(), graph.num_edges());
    for n in graph.nodes() {
        dg.add_node(n);
    }
    for n in graph.nodes() {
        for c in graph.children(n) {
            dg.add_edge(NodeIndex::new(n), NodeIndex::new(c), ());
        }
    }
    dg
}

/// Check whether adding `source --> target` would close a directed cycle.
pub fn would_create_cycle(graph: &EndpointGraph, source: usize, target: usize) -> bool {
    if source == target {
        return true;
    }
    has_path(&directed_projection(graph), target, source)
}

/// DFS reachability over the projection.
fn has_path(dg: &DiGraph<usize, ()>, from: usize, to: usize) -> bool {
    let mut dfs = Dfs::new(dg, NodeIndex::new(from));
    while let Some(node) = dfs.next(dg) {
        if node.index() == to {
            return true;
        }
    }
    false
}

/// Whether the directed edges form no cycle.
pub fn is_acyclic(graph: &EndpointGraph) -> bool {
    !is_cyclic_directed(&directed_projection(graph))
}

/// Strongly connected components with more than one node.
pub fn find_cycles(graph: &EndpointGraph) -> Vec<Vec<usize>> {
    tarjan_scc(&directed_projection(graph))
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut nodes: Vec<usize> = scc.into_iter().map(NodeIndex::index).collect();
            nodes.sort_unstable();
            nodes
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_back_edge() {
        let g = EndpointGraph::from_directed(&["A", "B", "C"], &[("A", "B"), ("B", "C")]).unwrap();
        assert!(would_create_cycle(&g, 2, 0));
        assert!(!would_create_cycle(&g, 0, 2));
        assert!(is_acyclic(&g));
    }

    #[test]
    fn reports_cycle_members() {
        let mut g = EndpointGraph::from_directed(&["A", "B", "C"], &[("A", "B"), ("B", "C")]).unwrap();
        g.add_directed(2, 0);
        assert_eq!(find_cycles(&g), vec![vec![0, 1, 2]]);
        assert!(!is_acyclic(&g));
    }
}
