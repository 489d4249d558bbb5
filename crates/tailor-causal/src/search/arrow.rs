//! Candidate edits queued by the search, best bump first.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

/// A scored candidate insertion or deletion of `a --> b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub a: usize,
    pub b: usize,
    /// T for insertions, H for deletions.
    pub h_or_t: Vec<usize>,
    /// Undirected neighbours of `b` not adjacent to `a` when scored. Only
    /// set for insertions.
    pub t_neighbors: Option<Vec<usize>>,
    /// Undirected neighbours of `b` adjacent to `a` when scored.
    pub na_yx: Vec<usize>,
    pub bump: f64,
}

/// Queue order: larger bump first, then earlier insertion.
#[derive(Debug, Clone, Copy)]
pub struct ArrowKey {
    bump: f64,
    index: u64,
}

impl PartialEq for ArrowKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArrowKey {}

impl PartialOrd for ArrowKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArrowKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bump
            .total_cmp(&self.bump)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Sorted arrow queue with per-pair lookup so stale arrows can be cleared.
#[derive(Debug, Default)]
pub struct ArrowQueue {
    sorted: BTreeMap<ArrowKey, Arrow>,
    lookup: FxHashMap<(usize, usize), Vec<ArrowKey>>,
    next_index: u64,
}

impl ArrowQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, arrow: Arrow) {
        let key = ArrowKey {
            bump: arrow.bump,
            index: self.next_index,
        };
        self.next_index += 1;
        self.lookup.entry((arrow.a, arrow.b)).or_default().push(key);
        self.sorted.insert(key, arrow);
    }

    /// Remove and return the best arrow.
    pub fn pop(&mut self) -> Option<Arrow> {
        let (key, arrow) = self.sorted.pop_first()?;
        if let Some(keys) = self.lookup.get_mut(&(arrow.a, arrow.b)) {
            keys.retain(|k| k.index != key.index);
        }
        Some(arrow)
    }

    /// Drop every queued arrow for the ordered pair `(a, b)`.
    pub fn clear_pair(&mut self, a: usize, b: usize) {
        if let Some(keys) = self.lookup.remove(&(a, b)) {
            for key in keys {
                self.sorted.remove(&key);
            }
        }
    }

    pub fn clear(&mut self) {
        self.sorted.clear();
        self.lookup.clear();
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}
