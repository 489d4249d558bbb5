//! Path queries: d-connection and semi-directed reachability.

use std::collections::{BTreeSet, VecDeque};

use rustc_hash::FxHashSet;

use super::endpoint::Endpoint;
use super::endpoint_graph::EndpointGraph;

/// Nodes d-connected to `x` given the empty set: reachable by a path with no
/// collider on it. Edges of any mark are followed; `b` is a collider on
/// `a *-> b <-* c`. The result may contain `x`.
pub fn unconditionally_d_connected(graph: &EndpointGraph, x: usize) -> BTreeSet<usize> {
    let mut reached = BTreeSet::new();
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut queue = VecDeque::new();

    for b in graph.adjacent(x) {
        seen.insert((x, b));
        queue.push_back((x, b));
        reached.insert(b);
    }

    while let Some((a, b)) = queue.pop_front() {
        let into_b = graph.endpoint(a, b) == Some(Endpoint::Arrow);
        for c in graph.adjacent(b) {
            if c == a {
                continue;
            }
            if into_b && graph.endpoint(c, b) == Some(Endpoint::Arrow) {
                continue;
            }
            if seen.insert((b, c)) {
                queue.push_back((b, c));
                reached.insert(c);
            }
        }
    }
    reached
}

/// Whether a semi-directed path runs from `from` to `to` with no interior
/// node in `blocked`. A step `t *-* u` is allowed when the mark at `t` is a
/// tail. Search depth is capped at `bound` levels.
pub fn exists_semi_directed_path(
    graph: &EndpointGraph,
    from: usize,
    to: usize,
    blocked: &[usize],
    bound: usize,
) -> bool {
    let mut seen = vec![false; graph.num_nodes()];
    let mut queue = VecDeque::from([(from, 0usize)]);
    seen[from] = true;

    while let Some((t, depth)) = queue.pop_front() {
        if t == to {
            return true;
        }
        if depth > bound {
            return false;
        }
        for u in graph.adjacent(t) {
            if graph.endpoint(u, t) != Some(Endpoint::Tail) {
                continue;
            }
            if blocked.contains(&u) {
                continue;
            }
            if u == to {
                return true;
            }
            if !seen[u] {
                seen[u] = true;
                queue.push_back((u, depth + 1));
            }
        }
    }
    false
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Direction {
    /// Arrived from a child.
    Up,
    /// Arrived from a parent.
    Down,
}

/// Whether `x` and `y` are d-separated by `z` in a DAG.
pub fn is_d_separated(dag: &EndpointGraph, x: usize, y: usize, z: &[usize]) -> bool {
    let z_set: FxHashSet<usize> = z.iter().copied().collect();
    let z_ancestors = dag.ancestors(z);
    let mut seen: FxHashSet<(usize, Direction)> = FxHashSet::default();
    let mut queue = VecDeque::from([(x, Direction::Up)]);

    while let Some((n, dir)) = queue.pop_front() {
        if !seen.insert((n, dir)) {
            continue;
        }
        if n == y && !z_set.contains(&n) {
            return false;
        }
        match dir {
            Direction::Up if !z_set.contains(&n) => {
                for p in dag.parents(n) {
                    queue.push_back((p, Direction::Up));
                }
                for c in dag.children(n) {
                    queue.push_back((c, Direction::Down));
                }
            }
            Direction::Up => {}
            Direction::Down => {
                if !z_set.contains(&n) {
                    for c in dag.children(n) {
                        queue.push_back((c, Direction::Down));
                    }
                }
                if z_ancestors.contains(&n) {
                    for p in dag.parents(n) {
                        queue.push_back((p, Direction::Up));
                    }
                }
            }
        }
    }
    true
}
