//! Test-instance alignment against the training schema.

use super::{Dataset, MISSING};
use crate::errors::SchemaError;

/// The single held-out row that instance-specific terms are computed for.
/// Values are in training column order and training category order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInstance {
    values: Vec<i32>,
}

impl TestInstance {
    /// Wrap values already in training order, validating length and range.
    pub fn new(train: &Dataset, values: Vec<i32>) -> Result<Self, SchemaError> {
        if values.len() != train.num_columns() {
            return Err(SchemaError::ColumnCountMismatch {
                expected: train.num_columns(),
                found: values.len(),
            });
        }
        for (col, &value) in values.iter().enumerate() {
            let arity = train.arity(col);
            if value != MISSING && (value < 0 || value as usize >= arity) {
                return Err(SchemaError::CategoryOutOfRange {
                    name: train.variable(col).name().to_string(),
                    row: 0,
                    value,
                    arity,
                });
            }
        }
        Ok(Self { values })
    }

    /// Accept a dataset that must hold exactly one row, aligning it to the
    /// training schema.
    pub fn from_single_row(train: &Dataset, test: &Dataset) -> Result<Self, SchemaError> {
        if test.num_rows() != 1 {
            return Err(SchemaError::NotSingleRow {
                rows: test.num_rows(),
            });
        }
        Self::align(train, test, 0)
    }

    /// Select `row` from a multi-row instance dataset and align it: columns are
    /// matched by name and category indices are remapped to training order.
    pub fn align(train: &Dataset, instances: &Dataset, row: usize) -> Result<Self, SchemaError> {
        if row >= instances.num_rows() {
            return Err(SchemaError::RowOutOfRange {
                row,
                rows: instances.num_rows(),
            });
        }
        let aligned = align_columns(instances, train)?;
        Ok(Self {
            values: aligned.row(row),
        })
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn value(&self, var: usize) -> i32 {
        self.values[var]
    }

    pub fn is_missing(&self, var: usize) -> bool {
        self.values[var] == MISSING
    }

    /// Values of `vars`, or `None` if any is missing.
    pub fn values_of(&self, vars: &[usize]) -> Option<Vec<i32>> {
        vars.iter()
            .map(|&v| {
                let value = self.values[v];
                (value != MISSING).then_some(value)
            })
            .collect()
    }
}

/// Reorder `instance` columns to match `train` by name and remap category
/// indices to the training label order. MISSING cells are preserved.
///
/// Extra instance columns are dropped. Label sets must be equal as sets.
pub fn align_columns(instance: &Dataset, train: &Dataset) -> Result<Dataset, SchemaError> {
    let mut variables = Vec::with_capacity(train.num_columns());
    let mut columns = Vec::with_capacity(train.num_columns());

    for train_var in train.variables() {
        let col = instance
            .index_of(train_var.name())
            .ok_or_else(|| SchemaError::MissingVariable {
                name: train_var.name().to_string(),
            })?;
        let inst_var = instance.variable(col);
        let values = instance.column(col);

        if inst_var.categories() == train_var.categories() {
            variables.push(train_var.clone());
            columns.push(values.to_vec());
            continue;
        }

        let mut remap = Vec::with_capacity(inst_var.arity());
        for label in inst_var.categories() {
            match train_var.category_index(label) {
                Some(k) => remap.push(k as i32),
                None => return Err(category_mismatch(train_var, inst_var)),
            }
        }
        if inst_var.arity() != train_var.arity() {
            return Err(category_mismatch(train_var, inst_var));
        }

        let remapped = values
            .iter()
            .map(|&v| if v == MISSING { MISSING } else { remap[v as usize] })
            .collect();
        variables.push(train_var.clone());
        columns.push(remapped);
    }

    Dataset::new(variables, columns)
}

fn category_mismatch(
    train: &super::Variable,
    instance: &super::Variable,
) -> SchemaError {
    SchemaError::CategoryMismatch {
        name: train.name().to_string(),
        train: train.categories().to_vec(),
        instance: instance.categories().to_vec(),
    }
}
