//! Schema errors: raised at construction when data does not fit the model.

use super::error_code::{self, TailorErrorCode};

/// Errors describing a training/test data schema violation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("variable '{name}' must be discrete with at least one category")]
    NotDiscrete { name: String },

    #[error("duplicate variable name '{name}'")]
    DuplicateVariable { name: String },

    #[error("column count mismatch: expected {expected}, found {found}")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("column '{name}' has {found} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("out-of-range category {value} at row {row} for variable '{name}' (arity {arity})")]
    CategoryOutOfRange {
        name: String,
        row: usize,
        value: i32,
        arity: usize,
    },

    #[error("instance-specific scoring expects a single-row test case, found {rows} rows")]
    NotSingleRow { rows: usize },

    #[error("instance row {row} out of range [0, {rows})")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("instance dataset is missing variable '{name}'")]
    MissingVariable { name: String },

    #[error("variable mismatch at index {index}: expected '{expected}', found '{found}'")]
    VariableMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("categories differ for variable '{name}': train {train:?}, instance {instance:?}")]
    CategoryMismatch {
        name: String,
        train: Vec<String>,
        instance: Vec<String>,
    },
}

impl TailorErrorCode for SchemaError {
    fn error_code(&self) -> &'static str {
        error_code::SCHEMA_ERROR
    }
}
