//! Combination enumeration used by the search and sepset phases.

/// Iterates the `k`-element index subsets of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        let current = (k <= n).then(|| (0..k).collect());
        Self { n, current }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.take()?;
        let k = out.len();
        let mut next = out.clone();
        // Advance the rightmost index that still has room.
        let mut i = k;
        while i > 0 {
            i -= 1;
            if next[i] < self.n - k + i {
                next[i] += 1;
                for j in i + 1..k {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                return Some(out);
            }
        }
        Some(out)
    }
}

/// The `k`-element subsets of `items`, in lexicographic index order.
pub fn subsets_of_size(items: &[usize], k: usize) -> impl Iterator<Item = Vec<usize>> + '_ {
    Combinations::new(items.len(), k).map(move |idx| idx.into_iter().map(|i| items[i]).collect())
}

/// Every subset of `items`, smallest first.
pub fn all_subsets(items: &[usize]) -> impl Iterator<Item = Vec<usize>> + '_ {
    (0..=items.len()).flat_map(move |k| subsets_of_size(items, k))
}

/// Sorted union of two sorted, duplicate-free lists.
pub fn union_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Elements of sorted `a` not in sorted `b`.
pub fn difference_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    a.iter().copied().filter(|x| b.binary_search(x).is_err()).collect()
}

/// Whether sorted `sub` is contained in sorted `sup`.
pub fn is_subset_sorted(sub: &[usize], sup: &[usize]) -> bool {
    sub.iter().all(|x| sup.binary_search(x).is_ok())
}
