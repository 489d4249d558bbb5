//! Child-by-parent-configuration count tables.

use tailor_core::data::{Dataset, MISSING};

use super::radix;

/// `n_jk` and `n_j` for one child and an ordered parent list.
///
/// Rows with the child or any parent MISSING are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable {
    child_arity: usize,
    parent_dims: Vec<usize>,
    n_jk: Vec<u32>,
    n_j: Vec<u32>,
}

impl CountTable {
    /// Count over every training row.
    pub fn compute(data: &Dataset, child: usize, parents: &[usize]) -> Self {
        Self::compute_over(data, child, parents, 0..data.num_rows())
    }

    /// Count over the given rows only.
    pub fn compute_over(
        data: &Dataset,
        child: usize,
        parents: &[usize],
        rows: impl IntoIterator<Item = usize>,
    ) -> Self {
        let child_arity = data.arity(child);
        let parent_dims: Vec<usize> = parents.iter().map(|&p| data.arity(p)).collect();
        let r = radix::num_configs(&parent_dims);
        let mut n_jk = vec![0u32; r * child_arity];
        let mut n_j = vec![0u32; r];

        let child_col = data.column(child);
        let parent_cols: Vec<&[i32]> = parents.iter().map(|&p| data.column(p)).collect();

        'rows: for row in rows {
            let k = child_col[row];
            if k == MISSING {
                continue;
            }
            let mut j = 0usize;
            for (col, &dim) in parent_cols.iter().zip(&parent_dims) {
                let v = col[row];
                if v == MISSING {
                    continue 'rows;
                }
                j = j * dim + v as usize;
            }
            n_jk[j * child_arity + k as usize] += 1;
            n_j[j] += 1;
        }

        Self {
            child_arity,
            parent_dims,
            n_jk,
            n_j,
        }
    }

    pub fn child_arity(&self) -> usize {
        self.child_arity
    }

    pub fn parent_dims(&self) -> &[usize] {
        &self.parent_dims
    }

    /// Number of parent configurations `q`.
    pub fn num_configs(&self) -> usize {
        self.n_j.len()
    }

    pub fn n_j(&self, j: usize) -> u32 {
        self.n_j[j]
    }

    pub fn n_jk(&self, j: usize, k: usize) -> u32 {
        self.n_jk[j * self.child_arity + k]
    }

    /// Counts for configuration `j`, one per child category.
    pub fn row(&self, j: usize) -> &[u32] {
        &self.n_jk[j * self.child_arity..(j + 1) * self.child_arity]
    }

    /// Rows that contributed to the table.
    pub fn total(&self) -> u64 {
        self.n_j.iter().map(|&n| n as u64).sum()
    }
}
