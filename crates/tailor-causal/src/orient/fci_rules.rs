//! FCI orientation rules over a PAG.
//!
//! Knowledge orientation (R0 background), then the R1-R4 fixpoint. With the
//! complete rule set enabled, R5-R10 follow for tail marks. Rules are applied
//! in place; every arrowhead placement goes through
//! [`FciOrient::is_arrowhead_allowed`].

use tracing::debug;

use tailor_core::config::OrientConfig;
use tailor_core::errors::SearchError;
use tailor_core::knowledge::Knowledge;
use tailor_core::traits::Cancellable;

use super::sepsets::SepsetProducer;
use crate::graph::{Endpoint, EndpointGraph};

use Endpoint::{Arrow, Circle, Tail};

/// Final orientation of a PAG skeleton whose colliders are already marked.
pub struct FciOrient<'a> {
    knowledge: &'a Knowledge,
    sepsets: Option<&'a dyn SepsetProducer>,
    complete_rule_set: bool,
    max_path_length: usize,
}

impl<'a> FciOrient<'a> {
    pub fn new(knowledge: &'a Knowledge) -> Self {
        Self {
            knowledge,
            sepsets: None,
            complete_rule_set: false,
            max_path_length: OrientConfig::default().path_length(),
        }
    }

    /// Take the rule set and path cap from `config`.
    pub fn with_config(self, config: &OrientConfig) -> Self {
        self.with_complete_rule_set(config.complete_rule_set)
            .with_max_path_length(config.path_length())
    }

    /// Sepsets consulted by the discriminating path rule.
    pub fn with_sepsets(mut self, sepsets: &'a dyn SepsetProducer) -> Self {
        self.sepsets = Some(sepsets);
        self
    }

    pub fn with_complete_rule_set(mut self, complete: bool) -> Self {
        self.complete_rule_set = complete;
        self
    }

    pub fn with_max_path_length(mut self, length: usize) -> Self {
        self.max_path_length = length;
        self
    }

    /// Whether an arrowhead may be placed at `y` on the edge `x *-* y`.
    ///
    /// An existing arrowhead stays allowed, a tail never becomes one, and
    /// knowledge that requires `y -> x` or forbids `x -> y` vetoes a circle.
    pub fn is_arrowhead_allowed(&self, graph: &EndpointGraph, x: usize, y: usize) -> bool {
        if !graph.is_adjacent(x, y) {
            return false;
        }
        match graph.endpoint(x, y) {
            Some(Arrow) => return true,
            Some(Tail) => return false,
            _ => {}
        }
        let (nx, ny) = (graph.name(x), graph.name(y));
        if self.knowledge.is_required(ny, nx) {
            return false;
        }
        if self.knowledge.is_forbidden(nx, ny) && graph.endpoint(y, x) != Some(Arrow) {
            return false;
        }
        graph.endpoint(x, y) == Some(Circle)
    }

    /// Apply forbidden and required edges to existing adjacencies. Names the
    /// graph does not contain are skipped.
    pub fn orient_by_knowledge(&self, graph: &mut EndpointGraph) {
        if self.knowledge.is_empty() {
            return;
        }
        for edge in self.knowledge.all_forbidden_among(graph.names()) {
            let (Some(from), Some(to)) = (graph.node_index(&edge.from), graph.node_index(&edge.to)) else {
                continue;
            };
            if !graph.is_adjacent(from, to) {
                continue;
            }
            // from <-o to
            graph.set_endpoint(to, from, Arrow);
            graph.set_endpoint(from, to, Circle);
        }
        for edge in self.knowledge.required_edges() {
            let (Some(from), Some(to)) = (graph.node_index(&edge.from), graph.node_index(&edge.to)) else {
                continue;
            };
            if !graph.is_adjacent(from, to) {
                continue;
            }
            graph.set_endpoint(to, from, Tail);
            graph.set_endpoint(from, to, Arrow);
        }
    }

    /// Run the rules to a fixpoint.
    ///
    /// Returns `Ok(false)` if cancellation was observed between epochs; the
    /// graph then holds every orientation applied so far.
    pub fn final_orientation(
        &self,
        graph: &mut EndpointGraph,
        cancel: &impl Cancellable,
    ) -> Result<bool, SearchError> {
        let sepsets = self.sepsets.ok_or(SearchError::MissingSepsets)?;

        let mut epochs = 0usize;
        loop {
            if cancel.is_cancelled() {
                return Ok(false);
            }
            epochs += 1;
            let mut changed = self.rules_r1_r2(graph);
            changed |= self.rule_r3(graph);
            if !changed {
                changed = self.rule_r4(graph, sepsets);
            }
            if !changed {
                break;
            }
        }
        debug!(epochs, "R1-R4 fixpoint reached");

        if !self.complete_rule_set {
            return Ok(true);
        }

        rule_r5(graph);
        loop {
            if cancel.is_cancelled() {
                return Ok(false);
            }
            let changed = rule_r6(graph) | rule_r7(graph);
            if !changed {
                break;
            }
        }
        loop {
            if cancel.is_cancelled() {
                return Ok(false);
            }
            if !rules_r8_r9_r10(graph) {
                break;
            }
        }
        Ok(true)
    }

    // ---- R1-R4 ----------------------------------------------------------

    fn rules_r1_r2(&self, graph: &mut EndpointGraph) -> bool {
        let mut changed = false;
        for b in graph.nodes() {
            let adj = graph.adjacent(b);
            for (i, &a) in adj.iter().enumerate() {
                for &c in &adj[i + 1..] {
                    changed |= self.rule_r1(graph, a, b, c);
                    changed |= self.rule_r1(graph, c, b, a);
                    changed |= self.rule_r2(graph, a, b, c);
                    changed |= self.rule_r2(graph, c, b, a);
                }
            }
        }
        changed
    }

    /// `a *-> b o-* c`, `a` and `c` not adjacent: `b --> c`.
    fn rule_r1(&self, graph: &mut EndpointGraph, a: usize, b: usize, c: usize) -> bool {
        if graph.is_adjacent(a, c) {
            return false;
        }
        if graph.endpoint(a, b) != Some(Arrow) || graph.endpoint(c, b) != Some(Circle) {
            return false;
        }
        if !self.is_arrowhead_allowed(graph, b, c) {
            return false;
        }
        graph.set_endpoint(c, b, Tail);
        graph.set_endpoint(b, c, Arrow);
        true
    }

    /// `a --> b *-> c` or `a *-> b --> c`, with `a *-o c`: `a *-> c`.
    fn rule_r2(&self, graph: &mut EndpointGraph, a: usize, b: usize, c: usize) -> bool {
        if !graph.is_adjacent(a, c) || graph.endpoint(a, c) != Some(Circle) {
            return false;
        }
        let into_b = graph.endpoint(a, b) == Some(Arrow);
        let into_c = graph.endpoint(b, c) == Some(Arrow);
        let tail = graph.endpoint(b, a) == Some(Tail) || graph.endpoint(c, b) == Some(Tail);
        if !(into_b && into_c && tail) {
            return false;
        }
        if !self.is_arrowhead_allowed(graph, a, c) {
            return false;
        }
        graph.set_endpoint(a, c, Arrow);
        true
    }

    /// `a *-> b <-* c`, `a *-o d o-* c`, `a` and `c` not adjacent,
    /// `d *-o b`: `d *-> b`.
    fn rule_r3(&self, graph: &mut EndpointGraph) -> bool {
        let mut changed = false;
        for b in graph.nodes() {
            let into_b = graph.nodes_into(b, Arrow);
            for (i, &a) in into_b.iter().enumerate() {
                for &c in &into_b[i + 1..] {
                    if graph.is_adjacent(a, c) {
                        continue;
                    }
                    for d in graph.adjacent(b) {
                        if d == a || d == c {
                            continue;
                        }
                        if !graph.is_adjacent(d, a) || !graph.is_adjacent(d, c) {
                            continue;
                        }
                        if graph.endpoint(a, d) != Some(Circle) || graph.endpoint(c, d) != Some(Circle) {
                            continue;
                        }
                        if graph.endpoint(d, b) != Some(Circle) {
                            continue;
                        }
                        if self.is_arrowhead_allowed(graph, d, b) {
                            graph.set_endpoint(d, b, Arrow);
                            changed = true;
                        }
                    }
                }
            }
        }
        changed
    }

    /// Discriminating paths `<x, ..., w, v, y>` for `v`, where `v o-> y`.
    fn rule_r4(&self, graph: &mut EndpointGraph, sepsets: &dyn SepsetProducer) -> bool {
        let mut changed = false;
        for y in graph.nodes() {
            for v in graph.nodes_into(y, Arrow) {
                if graph.endpoint(y, v) != Some(Circle) {
                    continue;
                }
                for w in graph.adjacent(v) {
                    if w == y || !graph.is_parent_of(w, y) || graph.endpoint(v, w) != Some(Arrow) {
                        continue;
                    }
                    if let Some(x) = self.discriminating_start(graph, w, v, y) {
                        if orient_discriminated(self, graph, sepsets, x, w, v, y) {
                            changed = true;
                            break;
                        }
                    }
                }
            }
        }
        changed
    }

    /// Walk back from `w` through colliders that are parents of `y` until a
    /// node not adjacent to `y` is found.
    fn discriminating_start(&self, graph: &EndpointGraph, w: usize, v: usize, y: usize) -> Option<usize> {
        let mut queue = std::collections::VecDeque::from([(w, vec![w])]);
        while let Some((t, path)) = queue.pop_front() {
            if path.len() + 1 > self.max_path_length {
                continue;
            }
            for x in graph.nodes_into(t, Arrow) {
                if x == v || x == y || path.contains(&x) {
                    continue;
                }
                if !graph.is_adjacent(x, y) {
                    return Some(x);
                }
                if graph.is_parent_of(x, y) && graph.endpoint(t, x) == Some(Arrow) {
                    let mut next = path.clone();
                    next.push(x);
                    queue.push_back((x, next));
                }
            }
        }
        None
    }
}

fn orient_discriminated(
    orient: &FciOrient<'_>,
    graph: &mut EndpointGraph,
    sepsets: &dyn SepsetProducer,
    x: usize,
    w: usize,
    v: usize,
    y: usize,
) -> bool {
    let Some(sepset) = sepsets.sepset(x, y) else {
        return false;
    };
    if sepset.contains(&v) {
        graph.set_endpoint(y, v, Tail);
        debug!(x, v, y, "discriminating path noncollider");
        return true;
    }
    if !orient.is_arrowhead_allowed(graph, w, v) || !orient.is_arrowhead_allowed(graph, y, v) {
        return false;
    }
    graph.set_endpoint(w, v, Arrow);
    graph.set_endpoint(y, v, Arrow);
    debug!(x, v, y, "discriminating path collider");
    true
}

// ---- R5-R10 --------------------------------------------------------------

fn is_nondirected(graph: &EndpointGraph, a: usize, b: usize) -> bool {
    graph.endpoint(a, b) == Some(Circle) && graph.endpoint(b, a) == Some(Circle)
}

fn set_undirected(graph: &mut EndpointGraph, a: usize, b: usize) {
    graph.set_endpoint(a, b, Tail);
    graph.set_endpoint(b, a, Tail);
}

/// `u` to `v` could be oriented `u --> v`.
fn potentially_directed(graph: &EndpointGraph, u: usize, v: usize) -> bool {
    graph.is_adjacent(u, v) && graph.endpoint(v, u) != Some(Arrow) && graph.endpoint(u, v) != Some(Tail)
}

/// `a o-o b` closing an uncovered circle path makes every edge on the cycle
/// undirected.
fn rule_r5(graph: &mut EndpointGraph) -> bool {
    let mut changed = false;
    for edge in graph.edges() {
        let (a, b) = (edge.a, edge.b);
        if !is_nondirected(graph, a, b) {
            continue;
        }
        if let Some(path) = uncovered_circle_path(graph, a, b) {
            for pair in path.windows(2) {
                set_undirected(graph, pair[0], pair[1]);
            }
            set_undirected(graph, a, b);
            changed = true;
        }
    }
    changed
}

/// An uncovered circle path `<a, g, ..., t, b>` with `g` not adjacent to `b`
/// and `t` not adjacent to `a`.
fn uncovered_circle_path(graph: &EndpointGraph, a: usize, b: usize) -> Option<Vec<usize>> {
    for g in graph.adjacent(a) {
        if g == b || graph.is_adjacent(g, b) || !is_nondirected(graph, a, g) {
            continue;
        }
        let mut path = vec![a, g];
        if extend_circle_path(graph, &mut path, a, b) {
            return Some(path);
        }
    }
    None
}

fn extend_circle_path(graph: &EndpointGraph, path: &mut Vec<usize>, a: usize, b: usize) -> bool {
    let last = path[path.len() - 1];
    let prev = path[path.len() - 2];
    for next in graph.adjacent(last) {
        if path.contains(&next) || !is_nondirected(graph, last, next) || graph.is_adjacent(prev, next) {
            continue;
        }
        if next == b {
            if path.len() >= 3 && !graph.is_adjacent(last, a) {
                path.push(b);
                return true;
            }
            continue;
        }
        path.push(next);
        if extend_circle_path(graph, path, a, b) {
            return true;
        }
        path.pop();
    }
    false
}

/// `a --- b o-* c`: `b --* c`.
fn rule_r6(graph: &mut EndpointGraph) -> bool {
    let mut changed = false;
    for edge in graph.edges() {
        if !graph.is_undirected(edge.a, edge.b) {
            continue;
        }
        for (a, b) in [(edge.a, edge.b), (edge.b, edge.a)] {
            for c in graph.adjacent(b) {
                if c != a && graph.endpoint(c, b) == Some(Circle) {
                    graph.set_endpoint(c, b, Tail);
                    changed = true;
                }
            }
        }
    }
    changed
}

/// `a --o b o-* c`, `a` and `c` not adjacent: `b --* c`.
fn rule_r7(graph: &mut EndpointGraph) -> bool {
    let mut changed = false;
    for edge in graph.edges() {
        for (a, b) in [(edge.a, edge.b), (edge.b, edge.a)] {
            if graph.endpoint(b, a) != Some(Tail) || graph.endpoint(a, b) != Some(Circle) {
                continue;
            }
            for c in graph.adjacent(b) {
                if c == a || graph.is_adjacent(a, c) {
                    continue;
                }
                if graph.endpoint(c, b) == Some(Circle) {
                    graph.set_endpoint(c, b, Tail);
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Turn `a o-> c` into `a --> c` by R8, R9 or R10, in that order.
fn rules_r8_r9_r10(graph: &mut EndpointGraph) -> bool {
    let mut changed = false;
    for c in graph.nodes() {
        for a in graph.nodes_into(c, Arrow) {
            if graph.endpoint(c, a) != Some(Circle) {
                continue;
            }
            if rule_r8(graph, a, c) || rule_r9(graph, a, c) || rule_r10(graph, a, c) {
                graph.set_endpoint(c, a, Tail);
                changed = true;
            }
        }
    }
    changed
}

/// `a --> b --> c` or `a -o b --> c`.
fn rule_r8(graph: &EndpointGraph, a: usize, c: usize) -> bool {
    graph.adjacent(a).into_iter().any(|b| {
        b != c
            && graph.is_directed(b, c)
            && graph.endpoint(b, a) == Some(Tail)
            && matches!(graph.endpoint(a, b), Some(Arrow) | Some(Circle))
    })
}

/// An uncovered potentially directed path `<a, b, ..., c>` with `b` not
/// adjacent to `c`.
fn rule_r9(graph: &EndpointGraph, a: usize, c: usize) -> bool {
    graph
        .adjacent(a)
        .into_iter()
        .any(|b| b != c && !graph.is_adjacent(b, c) && uncovered_pd_path_via(graph, a, b, c))
}

/// `b --> c <-- d` with uncovered potentially directed paths from `a` to `b`
/// and to `d` leaving `a` through distinct nonadjacent neighbours.
fn rule_r10(graph: &EndpointGraph, a: usize, c: usize) -> bool {
    let into_c: Vec<usize> = graph
        .parents(c)
        .into_iter()
        .filter(|&p| p != a)
        .collect();
    if into_c.len() < 2 {
        return false;
    }
    let adj_a = graph.adjacent(a);
    for (i, &b) in into_c.iter().enumerate() {
        for &d in &into_c[i + 1..] {
            for &mu in &adj_a {
                for &omega in &adj_a {
                    if mu == omega || graph.is_adjacent(mu, omega) {
                        continue;
                    }
                    if uncovered_pd_path_via(graph, a, mu, b) && uncovered_pd_path_via(graph, a, omega, d) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// Whether an uncovered potentially directed path runs from `from` through
/// `via` to `to`. `via == to` counts as a one-edge path.
fn uncovered_pd_path_via(graph: &EndpointGraph, from: usize, via: usize, to: usize) -> bool {
    if !potentially_directed(graph, from, via) {
        return false;
    }
    if via == to {
        return true;
    }
    let mut path = vec![from, via];
    extend_pd_path(graph, &mut path, to)
}

fn extend_pd_path(graph: &EndpointGraph, path: &mut Vec<usize>, to: usize) -> bool {
    let last = path[path.len() - 1];
    let prev = path[path.len() - 2];
    for next in graph.adjacent(last) {
        if path.contains(&next) || graph.is_adjacent(prev, next) || !potentially_directed(graph, last, next) {
            continue;
        }
        if next == to {
            return true;
        }
        path.push(next);
        if extend_pd_path(graph, path, to) {
            return true;
        }
        path.pop();
    }
    false
}

impl std::fmt::Debug for FciOrient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FciOrient")
            .field("has_sepsets", &self.sepsets.is_some())
            .field("complete_rule_set", &self.complete_rule_set)
            .field("max_path_length", &self.max_path_length)
            .finish()
    }
}
