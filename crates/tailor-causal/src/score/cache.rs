//! Local score cache shared by parallel bump workers.

use moka::sync::Cache;
use smallvec::SmallVec;

/// Parent lists are short; most fit inline.
pub type ParentSet = SmallVec<[usize; 8]>;

/// Cache key: node plus sorted IS and POP parent sets.
///
/// The POP parent set is part of the key, so a change in a node's population
/// context can never hit a stale entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreKey {
    pub node: usize,
    pub parents_is: ParentSet,
    pub parents_pop: ParentSet,
}

impl ScoreKey {
    pub fn new(node: usize, parents_is: &[usize], parents_pop: &[usize]) -> Self {
        Self {
            node,
            parents_is: sorted(parents_is),
            parents_pop: sorted(parents_pop),
        }
    }
}

fn sorted(set: &[usize]) -> ParentSet {
    let mut out: ParentSet = set.iter().copied().collect();
    out.sort_unstable();
    out
}

/// In-memory local score cache using moka (TinyLFU admission).
pub struct LocalScoreCache {
    cache: Cache<ScoreKey, f64>,
}

impl LocalScoreCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Cached value, computing and inserting it on a miss.
    pub fn get_or_compute(&self, key: ScoreKey, compute: impl FnOnce() -> f64) -> f64 {
        self.cache.get_with(key, compute)
    }

    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl std::fmt::Debug for LocalScoreCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalScoreCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
