use serde::{Deserialize, Serialize};

use crate::errors::SchemaError;

/// A categorical variable: a stable name and its ordered category labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    categories: Vec<String>,
}

impl Variable {
    /// Create a variable. At least one category is required.
    pub fn new(
        name: impl Into<String>,
        categories: Vec<String>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if categories.is_empty() {
            return Err(SchemaError::NotDiscrete { name });
        }
        Ok(Self { name, categories })
    }

    /// Variable with categories labelled `"0"`, `"1"`, ... `arity - 1`.
    pub fn with_arity(name: impl Into<String>, arity: usize) -> Result<Self, SchemaError> {
        Self::new(name, (0..arity).map(|k| k.to_string()).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of categories.
    pub fn arity(&self) -> usize {
        self.categories.len()
    }

    /// Index of a category label.
    pub fn category_index(&self, label: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == label)
    }
}
