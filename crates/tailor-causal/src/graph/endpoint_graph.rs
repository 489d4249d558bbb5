//! Mixed graph over a fixed, named node set with a mark at each edge end.
//!
//! Covers DAGs, CPDAGs (directed plus undirected edges) and PAGs (circle,
//! arrow and tail marks). Node indices line up with dataset column indices.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tailor_core::errors::SearchError;

use super::endpoint::{Edge, Endpoint};

/// Mixed graph keyed by node index.
///
/// `marks[a][b]` is the mark at `b` on the edge `a *-* b`; an edge is present
/// iff both `marks[a][b]` and `marks[b][a]` are.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointGraph {
    names: Vec<String>,
    index: FxHashMap<String, usize>,
    marks: Vec<BTreeMap<usize, Endpoint>>,
}

/// Serializable edge-list view of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

impl EndpointGraph {
    /// An empty graph over `names`.
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let marks = vec![BTreeMap::new(); names.len()];
        Self {
            names,
            index,
            marks,
        }
    }

    /// Build a DAG from `(from, to)` name pairs.
    pub fn from_directed(names: &[&str], edges: &[(&str, &str)]) -> Result<Self, SearchError> {
        let mut graph = Self::new(names.iter().map(|s| s.to_string()).collect());
        for (from, to) in edges {
            let a = graph.require(from)?;
            let b = graph.require(to)?;
            graph.add_directed(a, b);
        }
        Ok(graph)
    }

    /// Same nodes, no edges.
    pub fn empty_like(&self) -> Self {
        Self::new(self.names.clone())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Like [`node_index`](Self::node_index) but unknown names are an error.
    pub fn require(&self, name: &str) -> Result<usize, SearchError> {
        self.node_index(name).ok_or_else(|| SearchError::UnknownNode {
            name: name.to_string(),
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.names.len()
    }

    pub fn nodes(&self) -> std::ops::Range<usize> {
        0..self.names.len()
    }

    pub fn num_edges(&self) -> usize {
        self.marks.iter().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Whether both graphs are over the same names in the same order.
    pub fn same_nodes(&self, other: &EndpointGraph) -> bool {
        self.names == other.names
    }

    // ---- edges ----------------------------------------------------------

    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.marks[a].contains_key(&b)
    }

    /// Nodes adjacent to `node`, ascending.
    pub fn adjacent(&self, node: usize) -> Vec<usize> {
        self.marks[node].keys().copied().collect()
    }

    pub fn degree(&self, node: usize) -> usize {
        self.marks[node].len()
    }

    /// Mark at `b` on the edge `a *-* b`.
    pub fn endpoint(&self, a: usize, b: usize) -> Option<Endpoint> {
        self.marks[a].get(&b).copied()
    }

    /// Set the mark at `b` on the edge `a *-* b`. No-op if not adjacent.
    pub fn set_endpoint(&mut self, a: usize, b: usize, mark: Endpoint) -> bool {
        match self.marks[a].get_mut(&b) {
            Some(slot) => {
                *slot = mark;
                true
            }
            None => false,
        }
    }

    /// Insert or replace the edge between `a` and `b`.
    pub fn add_edge(&mut self, a: usize, b: usize, at_a: Endpoint, at_b: Endpoint) {
        debug_assert_ne!(a, b, "self loops are not representable");
        self.marks[a].insert(b, at_b);
        self.marks[b].insert(a, at_a);
    }

    pub fn add_directed(&mut self, from: usize, to: usize) {
        self.add_edge(from, to, Endpoint::Tail, Endpoint::Arrow);
    }

    pub fn add_undirected(&mut self, a: usize, b: usize) {
        self.add_edge(a, b, Endpoint::Tail, Endpoint::Tail);
    }

    pub fn remove_edge(&mut self, a: usize, b: usize) -> bool {
        let removed = self.marks[a].remove(&b).is_some();
        self.marks[b].remove(&a);
        removed
    }

    pub fn edge(&self, a: usize, b: usize) -> Option<Edge> {
        Some(Edge::new(a, b, self.endpoint(b, a)?, self.endpoint(a, b)?))
    }

    /// Every edge once, with `a < b`.
    pub fn edges(&self) -> Vec<Edge> {
        let mut out = Vec::with_capacity(self.num_edges());
        for a in self.nodes() {
            for (&b, &at_b) in self.marks[a].range(a + 1..) {
                out.push(Edge::new(a, b, self.marks[b][&a], at_b));
            }
        }
        out
    }

    pub fn remove_all_edges(&mut self) {
        for m in &mut self.marks {
            m.clear();
        }
    }

    /// Set every mark on every edge to `mark`.
    pub fn reorient_all(&mut self, mark: Endpoint) {
        for m in &mut self.marks {
            for slot in m.values_mut() {
                *slot = mark;
            }
        }
    }

    // ---- edge kinds -----------------------------------------------------

    /// `from --> to`.
    pub fn is_directed(&self, from: usize, to: usize) -> bool {
        self.endpoint(from, to) == Some(Endpoint::Arrow)
            && self.endpoint(to, from) == Some(Endpoint::Tail)
    }

    /// `a --- b`.
    pub fn is_undirected(&self, a: usize, b: usize) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Tail) && self.endpoint(b, a) == Some(Endpoint::Tail)
    }

    pub fn is_parent_of(&self, parent: usize, child: usize) -> bool {
        self.is_directed(parent, child)
    }

    /// Parents of `node`, ascending.
    pub fn parents(&self, node: usize) -> Vec<usize> {
        self.marks[node]
            .keys()
            .copied()
            .filter(|&p| self.is_directed(p, node))
            .collect()
    }

    /// Children of `node`, ascending.
    pub fn children(&self, node: usize) -> Vec<usize> {
        self.marks[node]
            .keys()
            .copied()
            .filter(|&c| self.is_directed(node, c))
            .collect()
    }

    /// Nodes joined to `node` by an undirected (tail-tail) edge.
    pub fn undirected_neighbors(&self, node: usize) -> Vec<usize> {
        self.marks[node]
            .keys()
            .copied()
            .filter(|&n| self.is_undirected(node, n))
            .collect()
    }

    /// Adjacent nodes `a` whose edge carries `mark` at `node`.
    pub fn nodes_into(&self, node: usize, mark: Endpoint) -> Vec<usize> {
        self.marks[node]
            .keys()
            .copied()
            .filter(|&a| self.endpoint(a, node) == Some(mark))
            .collect()
    }

    /// `a *-> b <-* c`.
    pub fn is_def_collider(&self, a: usize, b: usize, c: usize) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Arrow) && self.endpoint(c, b) == Some(Endpoint::Arrow)
    }

    /// Whether every edge is directed.
    pub fn is_fully_directed(&self) -> bool {
        self.edges().iter().all(Edge::is_directed)
    }

    /// Whether all pairs in `nodes` are adjacent.
    pub fn is_clique(&self, nodes: &[usize]) -> bool {
        nodes.iter().enumerate().all(|(i, &a)| {
            nodes[i + 1..].iter().all(|&b| self.is_adjacent(a, b))
        })
    }

    // ---- reachability ---------------------------------------------------

    /// Whether `ancestor` reaches `node` along directed edges (or equals it).
    pub fn is_ancestor_of(&self, ancestor: usize, node: usize) -> bool {
        if ancestor == node {
            return true;
        }
        let mut seen = vec![false; self.num_nodes()];
        let mut queue = VecDeque::from([ancestor]);
        seen[ancestor] = true;
        while let Some(n) = queue.pop_front() {
            for c in self.children(n) {
                if c == node {
                    return true;
                }
                if !seen[c] {
                    seen[c] = true;
                    queue.push_back(c);
                }
            }
        }
        false
    }

    /// Ancestors of every node in `of`, including `of` itself.
    pub fn ancestors(&self, of: &[usize]) -> BTreeSet<usize> {
        let mut out: BTreeSet<usize> = of.iter().copied().collect();
        let mut stack: Vec<usize> = of.to_vec();
        while let Some(n) = stack.pop() {
            for p in self.parents(n) {
                if out.insert(p) {
                    stack.push(p);
                }
            }
        }
        out
    }

    // ---- display --------------------------------------------------------

    /// Edge strings such as `A --> B`, in `edges()` order.
    pub fn edge_strings(&self) -> Vec<String> {
        self.edges().iter().map(|e| e.render(&self.names)).collect()
    }

    /// Whether the graph contains the edge described by `spec`, e.g. `"A o-> B"`.
    pub fn has_edge_str(&self, spec: &str) -> bool {
        let mut parts = spec.split_whitespace();
        let (Some(a), Some(mid), Some(b)) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        let (Some(a), Some(b)) = (self.node_index(a), self.node_index(b)) else {
            return false;
        };
        let glyphs: Vec<char> = mid.chars().collect();
        if glyphs.len() != 3 {
            return false;
        }
        let left = match glyphs[0] {
            '-' => Endpoint::Tail,
            '<' => Endpoint::Arrow,
            'o' => Endpoint::Circle,
            _ => return false,
        };
        let right = match glyphs[2] {
            '-' => Endpoint::Tail,
            '>' => Endpoint::Arrow,
            'o' => Endpoint::Circle,
            _ => return false,
        };
        self.endpoint(b, a) == Some(left) && self.endpoint(a, b) == Some(right)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.names.clone(),
            edges: self.edge_strings(),
        }
    }
}

impl std::fmt::Display for EndpointGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.edge_strings().iter().enumerate() {
            writeln!(f, "{}. {e}", i + 1)?;
        }
        Ok(())
    }
}
