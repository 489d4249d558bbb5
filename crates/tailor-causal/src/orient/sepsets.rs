//! Greedy separating sets restricted to a graph's adjacencies.

use dashmap::DashMap;

use crate::graph::EndpointGraph;
use crate::independence::IndependenceTest;
use crate::search::subsets::subsets_of_size;

/// Produces a separating set for a pair of nodes, or `None`.
pub trait SepsetProducer: Send + Sync {
    fn sepset(&self, a: usize, b: usize) -> Option<Vec<usize>>;
}

/// Searches conditioning sets drawn from the adjacents of either endpoint
/// in a fixed graph, smallest first, and returns the first that separates.
///
/// Results are memoized per unordered pair for the producer's lifetime.
pub struct SepsetsGreedy<'a> {
    graph: &'a EndpointGraph,
    test: &'a dyn IndependenceTest,
    depth: Option<usize>,
    memo: DashMap<(usize, usize), Option<Vec<usize>>>,
}

impl<'a> SepsetsGreedy<'a> {
    /// `depth` caps the conditioning set size; `None` is unlimited.
    pub fn new(graph: &'a EndpointGraph, test: &'a dyn IndependenceTest, depth: Option<usize>) -> Self {
        Self {
            graph,
            test,
            depth,
            memo: DashMap::new(),
        }
    }

    pub fn is_independent(&self, a: usize, b: usize, z: &[usize]) -> bool {
        self.test.is_independent(a, b, z)
    }

    fn search(&self, a: usize, b: usize) -> Option<Vec<usize>> {
        let adj_a: Vec<usize> = self.graph.adjacent(a).into_iter().filter(|&n| n != b).collect();
        let adj_b: Vec<usize> = self.graph.adjacent(b).into_iter().filter(|&n| n != a).collect();
        let widest = adj_a.len().max(adj_b.len());
        let max_depth = self.depth.map_or(widest, |d| d.min(widest));

        for d in 0..=max_depth {
            for adj in [&adj_a, &adj_b] {
                if d > adj.len() {
                    continue;
                }
                for z in subsets_of_size(adj, d) {
                    if self.test.is_independent(a, b, &z) {
                        return Some(z);
                    }
                }
            }
        }
        None
    }
}

impl SepsetProducer for SepsetsGreedy<'_> {
    fn sepset(&self, a: usize, b: usize) -> Option<Vec<usize>> {
        let key = (a.min(b), a.max(b));
        if let Some(hit) = self.memo.get(&key) {
            return hit.clone();
        }
        let found = self.search(key.0, key.1);
        self.memo.insert(key, found.clone());
        found
    }
}

impl std::fmt::Debug for SepsetsGreedy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SepsetsGreedy")
            .field("depth", &self.depth)
            .field("memoized", &self.memo.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::independence::DSeparationTest;

    #[test]
    fn chain_is_separated_by_middle_node() {
        let dag = EndpointGraph::from_directed(&["A", "B", "C"], &[("A", "B"), ("B", "C")]).unwrap();
        let test = DSeparationTest::new(dag.clone()).unwrap();
        let sepsets = SepsetsGreedy::new(&dag, &test, None);
        assert_eq!(sepsets.sepset(0, 2), Some(vec![1]));
        assert_eq!(sepsets.sepset(2, 0), Some(vec![1]));
        assert_eq!(sepsets.sepset(0, 1), None);
    }

    #[test]
    fn depth_cap_limits_conditioning() {
        let dag = EndpointGraph::from_directed(&["A", "B", "C"], &[("A", "B"), ("B", "C")]).unwrap();
        let test = DSeparationTest::new(dag.clone()).unwrap();
        let sepsets = SepsetsGreedy::new(&dag, &test, Some(0));
        assert_eq!(sepsets.sepset(0, 2), None);
    }
}
