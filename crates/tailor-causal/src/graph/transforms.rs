//! Whole-graph transforms: consistent DAG extension and knowledge checks.

use std::collections::BTreeSet;

use tailor_core::errors::SearchError;
use tailor_core::knowledge::Knowledge;

use super::endpoint_graph::EndpointGraph;

/// A DAG in the equivalence class of a CPDAG (Dor and Tarsi).
///
/// Repeatedly removes a sink whose undirected neighbours are adjacent to all
/// of its other neighbours, pointing those undirected edges into it.
pub fn dag_from_cpdag(cpdag: &EndpointGraph) -> Result<EndpointGraph, SearchError> {
    extend(cpdag, None)
}

/// Like [`dag_from_cpdag`], but among admissible sinks prefers the one whose
/// undirected edges `hints` already points into it, so the extension keeps
/// as many of the hinted orientations as the class allows.
pub fn dag_from_cpdag_guided(cpdag: &EndpointGraph, hints: &EndpointGraph) -> Result<EndpointGraph, SearchError> {
    extend(cpdag, Some(hints))
}

fn extend(cpdag: &EndpointGraph, hints: Option<&EndpointGraph>) -> Result<EndpointGraph, SearchError> {
    let mut dag = cpdag.clone();
    let mut remaining: BTreeSet<usize> = cpdag.nodes().collect();

    while !remaining.is_empty() {
        let admissible = remaining.iter().copied().filter(|&x| {
            let is_sink = cpdag
                .children(x)
                .into_iter()
                .all(|c| !remaining.contains(&c));
            if !is_sink {
                return false;
            }
            let neighbors: Vec<usize> = cpdag
                .adjacent(x)
                .into_iter()
                .filter(|n| remaining.contains(n))
                .collect();
            cpdag
                .undirected_neighbors(x)
                .into_iter()
                .filter(|y| remaining.contains(y))
                .all(|y| neighbors.iter().all(|&z| z == y || cpdag.is_adjacent(y, z)))
        });
        // Ties keep the lowest index.
        let sink = match hints {
            None => admissible.min(),
            Some(hints) => admissible.min_by_key(|&x| {
                cpdag
                    .undirected_neighbors(x)
                    .into_iter()
                    .filter(|y| remaining.contains(y) && hints.is_directed(x, *y))
                    .count()
            }),
        };

        let Some(x) = sink else {
            return Err(SearchError::InvalidArgument {
                reason: "graph has no consistent DAG extension".to_string(),
            });
        };
        for y in cpdag.undirected_neighbors(x) {
            if remaining.contains(&y) {
                dag.add_directed(y, x);
            }
        }
        remaining.remove(&x);
    }
    Ok(dag)
}

/// Whether a directed graph contradicts `knowledge`: a forbidden edge is
/// present, or a required edge between known nodes is absent.
pub fn violates_knowledge(graph: &EndpointGraph, knowledge: &Knowledge) -> bool {
    for edge in knowledge.required_edges() {
        if let (Some(a), Some(b)) = (graph.node_index(&edge.from), graph.node_index(&edge.to)) {
            if !graph.is_directed(a, b) {
                return true;
            }
        }
    }
    for a in graph.nodes() {
        for b in graph.children(a) {
            if knowledge.is_forbidden(graph.name(a), graph.name(b)) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::dag_enforcement::is_acyclic;

    #[test]
    fn extension_keeps_colliders_and_skeleton() {
        let mut g = EndpointGraph::new(vec!["A".into(), "B".into(), "C".into(), "D".into()]);
        g.add_directed(0, 2);
        g.add_directed(1, 2);
        g.add_undirected(2, 3);
        g.add_undirected(0, 3);
        // D is the only admissible sink, so both undirected edges point into it.
        let dag = dag_from_cpdag(&g).unwrap();
        assert!(dag.is_fully_directed());
        assert!(is_acyclic(&dag));
        assert_eq!(dag.num_edges(), 4);
        assert!(dag.is_directed(0, 2));
        assert!(dag.is_directed(1, 2));
        assert!(dag.is_directed(2, 3));
        assert!(dag.is_directed(0, 3));
    }

    #[test]
    fn guided_extension_follows_hints() {
        let names: Vec<String> = vec!["A".into(), "B".into(), "C".into()];
        let mut g = EndpointGraph::new(names.clone());
        g.add_undirected(0, 1);
        g.add_undirected(1, 2);
        assert!(dag_from_cpdag(&g).unwrap().is_directed(1, 0));

        let mut hints = EndpointGraph::new(names);
        hints.add_directed(0, 1);
        hints.add_directed(1, 2);
        let dag = dag_from_cpdag_guided(&g, &hints).unwrap();
        assert!(dag.is_directed(0, 1));
        assert!(dag.is_directed(1, 2));
    }
}
