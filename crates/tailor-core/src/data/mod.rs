//! Categorical data model.
//!
//! Training data is stored column-major: one `Vec<i32>` per variable holding
//! 0-based category indices or the [`MISSING`] sentinel. The test instance is
//! a single row over the same schema, aligned by name and remapped to the
//! training category order at load time.

pub mod dataset;
pub mod instance;
pub mod variable;

pub use dataset::Dataset;
pub use instance::{align_columns, TestInstance};
pub use variable::Variable;

use crate::config::defaults;

/// Sentinel for a missing cell. Outside every valid category range.
pub const MISSING: i32 = defaults::MISSING_VALUE;

/// Narrow read-only view of tabular categorical data supplied by a loader.
///
/// Implementations must guarantee every value is either a valid 0-based
/// category index for its column or [`MISSING`].
pub trait TabularSource {
    fn num_rows(&self) -> usize;
    fn num_columns(&self) -> usize;
    fn variable(&self, col: usize) -> &Variable;
    fn get_int(&self, row: usize, col: usize) -> i32;
}
