//! Meek orientation rules for keeping a CPDAG closed after each edit.

use std::collections::BTreeSet;

use tailor_core::knowledge::Knowledge;

use super::dag_enforcement::would_create_cycle;
use super::endpoint_graph::EndpointGraph;

/// Applies knowledge and Meek rules R1-R4 to a graph of directed and
/// undirected edges.
///
/// With `revert_to_unshielded_colliders` set, every directed edge that is not
/// part of an unshielded collider is first made undirected, so the result is
/// the CPDAG implied by the colliders alone.
#[derive(Debug, Clone)]
pub struct MeekRules<'a> {
    knowledge: &'a Knowledge,
    revert_to_unshielded_colliders: bool,
}

impl<'a> MeekRules<'a> {
    pub fn new(knowledge: &'a Knowledge) -> Self {
        Self {
            knowledge,
            revert_to_unshielded_colliders: true,
        }
    }

    pub fn with_revert(mut self, revert: bool) -> Self {
        self.revert_to_unshielded_colliders = revert;
        self
    }

    /// Orient `graph` in place. Returns every node with an edge whose marks
    /// changed.
    pub fn orient_implied(&self, graph: &mut EndpointGraph) -> BTreeSet<usize> {
        let mut changed = BTreeSet::new();
        if self.revert_to_unshielded_colliders {
            self.revert(graph, &mut changed);
        }
        self.orient_by_knowledge(graph, &mut changed);

        loop {
            let mut progress = false;
            for edge in graph.edges() {
                let (a, b) = (edge.a, edge.b);
                if !graph.is_undirected(a, b) {
                    continue;
                }
                if self.try_orient(graph, a, b) || self.try_orient(graph, b, a) {
                    changed.insert(a);
                    changed.insert(b);
                    progress = true;
                }
            }
            if !progress {
                break;
            }
        }
        changed
    }

    fn revert(&self, graph: &mut EndpointGraph, changed: &mut BTreeSet<usize>) {
        let mut keep = BTreeSet::new();
        for y in graph.nodes() {
            let parents = graph.parents(y);
            for (i, &p1) in parents.iter().enumerate() {
                for &p2 in &parents[i + 1..] {
                    if !graph.is_adjacent(p1, p2) {
                        keep.insert((p1, y));
                        keep.insert((p2, y));
                    }
                }
            }
        }
        for edge in graph.edges() {
            let (from, to) = if graph.is_directed(edge.a, edge.b) {
                (edge.a, edge.b)
            } else if graph.is_directed(edge.b, edge.a) {
                (edge.b, edge.a)
            } else {
                continue;
            };
            if !keep.contains(&(from, to)) {
                graph.add_undirected(from, to);
                changed.insert(from);
                changed.insert(to);
            }
        }
    }

    fn orient_by_knowledge(&self, graph: &mut EndpointGraph, changed: &mut BTreeSet<usize>) {
        if self.knowledge.is_empty() {
            return;
        }
        for edge in graph.edges() {
            let (a, b) = (edge.a, edge.b);
            if !graph.is_undirected(a, b) {
                continue;
            }
            let (na, nb) = (graph.name(a), graph.name(b));
            let target = if self.knowledge.is_required(na, nb) {
                Some((a, b))
            } else if self.knowledge.is_required(nb, na) {
                Some((b, a))
            } else if self.knowledge.is_forbidden(na, nb) && !self.knowledge.is_forbidden(nb, na) {
                Some((b, a))
            } else if self.knowledge.is_forbidden(nb, na) && !self.knowledge.is_forbidden(na, nb) {
                Some((a, b))
            } else {
                None
            };
            if let Some((from, to)) = target {
                if !would_create_cycle(graph, from, to) {
                    graph.add_directed(from, to);
                    changed.insert(from);
                    changed.insert(to);
                }
            }
        }
    }

    /// Orient undirected `a --- b` as `a --> b` if any rule applies.
    fn try_orient(&self, graph: &mut EndpointGraph, a: usize, b: usize) -> bool {
        if !(r1(graph, a, b) || r2(graph, a, b) || r3(graph, a, b) || r4(graph, a, b)) {
            return false;
        }
        if self.knowledge.is_forbidden(graph.name(a), graph.name(b)) {
            return false;
        }
        if would_create_cycle(graph, a, b) {
            return false;
        }
        graph.add_directed(a, b);
        true
    }
}

/// `c --> a --- b`, `c` not adjacent to `b`.
fn r1(g: &EndpointGraph, a: usize, b: usize) -> bool {
    g.parents(a).into_iter().any(|c| c != b && !g.is_adjacent(c, b))
}

/// `a --> c --> b` with `a --- b`.
fn r2(g: &EndpointGraph, a: usize, b: usize) -> bool {
    g.children(a).into_iter().any(|c| g.is_directed(c, b))
}

/// `a --- c --> b <-- d --- a`, `c` and `d` not adjacent.
fn r3(g: &EndpointGraph, a: usize, b: usize) -> bool {
    let cands: Vec<usize> = g
        .undirected_neighbors(a)
        .into_iter()
        .filter(|&c| c != b && g.is_directed(c, b))
        .collect();
    cands.iter().enumerate().any(|(i, &c)| {
        cands[i + 1..].iter().any(|&d| !g.is_adjacent(c, d))
    })
}

/// `a --- d --> c --> b`, `a` adjacent to `c`, `d` not adjacent to `b`.
fn r4(g: &EndpointGraph, a: usize, b: usize) -> bool {
    g.parents(b).into_iter().any(|c| {
        c != a
            && g.is_adjacent(a, c)
            && g.parents(c)
                .into_iter()
                .any(|d| d != b && g.is_undirected(a, d) && !g.is_adjacent(d, b))
    })
}
