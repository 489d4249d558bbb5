use rustc_hash::FxHashMap;

use super::{TabularSource, Variable, MISSING};
use crate::errors::SchemaError;

/// Column-major categorical dataset. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    variables: Vec<Variable>,
    columns: Vec<Vec<i32>>,
    num_rows: usize,
    index: FxHashMap<String, usize>,
}

impl Dataset {
    /// Build from one column per variable.
    ///
    /// Fails on duplicate names, ragged columns, or any cell that is neither a
    /// valid category index nor [`MISSING`].
    pub fn new(variables: Vec<Variable>, columns: Vec<Vec<i32>>) -> Result<Self, SchemaError> {
        if variables.len() != columns.len() {
            return Err(SchemaError::ColumnCountMismatch {
                expected: variables.len(),
                found: columns.len(),
            });
        }
        let num_rows = columns.first().map_or(0, Vec::len);
        let mut index = FxHashMap::default();
        for (col, (var, values)) in variables.iter().zip(&columns).enumerate() {
            if index.insert(var.name().to_string(), col).is_some() {
                return Err(SchemaError::DuplicateVariable {
                    name: var.name().to_string(),
                });
            }
            if values.len() != num_rows {
                return Err(SchemaError::RaggedColumn {
                    name: var.name().to_string(),
                    expected: num_rows,
                    found: values.len(),
                });
            }
            check_range(var, values)?;
        }
        Ok(Self {
            variables,
            columns,
            num_rows,
            index,
        })
    }

    /// Build from row-major values.
    pub fn from_rows(variables: Vec<Variable>, rows: &[Vec<i32>]) -> Result<Self, SchemaError> {
        let p = variables.len();
        let mut columns = vec![Vec::with_capacity(rows.len()); p];
        for row in rows {
            if row.len() != p {
                return Err(SchemaError::ColumnCountMismatch {
                    expected: p,
                    found: row.len(),
                });
            }
            for (col, &v) in row.iter().enumerate() {
                columns[col].push(v);
            }
        }
        Self::new(variables, columns)
    }

    /// Build from string labels. Categories are assigned in first-seen order;
    /// `missing_label` cells become [`MISSING`].
    pub fn from_labels(
        names: &[&str],
        rows: &[Vec<&str>],
        missing_label: &str,
    ) -> Result<Self, SchemaError> {
        let p = names.len();
        let mut categories: Vec<Vec<String>> = vec![Vec::new(); p];
        let mut columns = vec![Vec::with_capacity(rows.len()); p];
        for row in rows {
            if row.len() != p {
                return Err(SchemaError::ColumnCountMismatch {
                    expected: p,
                    found: row.len(),
                });
            }
            for (col, &label) in row.iter().enumerate() {
                if label == missing_label {
                    columns[col].push(MISSING);
                    continue;
                }
                let cats = &mut categories[col];
                let k = match cats.iter().position(|c| c == label) {
                    Some(k) => k,
                    None => {
                        cats.push(label.to_string());
                        cats.len() - 1
                    }
                };
                columns[col].push(k as i32);
            }
        }
        let variables = names
            .iter()
            .zip(categories)
            .map(|(name, cats)| Variable::new(*name, cats))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(variables, columns)
    }

    /// Copy any tabular source into a dataset, validating every cell.
    pub fn from_source(source: &dyn TabularSource) -> Result<Self, SchemaError> {
        let variables: Vec<Variable> = (0..source.num_columns())
            .map(|c| source.variable(c).clone())
            .collect();
        let columns = (0..source.num_columns())
            .map(|c| (0..source.num_rows()).map(|r| source.get_int(r, c)).collect())
            .collect();
        Self::new(variables, columns)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, col: usize) -> &Variable {
        &self.variables[col]
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.variables.len()
    }

    pub fn arity(&self, col: usize) -> usize {
        self.variables[col].arity()
    }

    /// Arities of all columns in index order.
    pub fn arities(&self) -> Vec<usize> {
        self.variables.iter().map(Variable::arity).collect()
    }

    pub fn column(&self, col: usize) -> &[i32] {
        &self.columns[col]
    }

    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.columns[col][row]
    }

    /// Column index of a variable name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name().to_string()).collect()
    }

    /// One row in column order.
    pub fn row(&self, row: usize) -> Vec<i32> {
        self.columns.iter().map(|c| c[row]).collect()
    }

    /// A new dataset holding only the given rows, in the given order.
    pub fn subset_rows(&self, rows: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| rows.iter().map(|&r| c[r]).collect())
            .collect();
        Dataset {
            variables: self.variables.clone(),
            columns,
            num_rows: rows.len(),
            index: self.index.clone(),
        }
    }
}

impl TabularSource for Dataset {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_columns(&self) -> usize {
        self.variables.len()
    }

    fn variable(&self, col: usize) -> &Variable {
        &self.variables[col]
    }

    fn get_int(&self, row: usize, col: usize) -> i32 {
        self.columns[col][row]
    }
}

fn check_range(var: &Variable, values: &[i32]) -> Result<(), SchemaError> {
    let arity = var.arity();
    for (row, &value) in values.iter().enumerate() {
        if value == MISSING {
            continue;
        }
        if value < 0 || value as usize >= arity {
            return Err(SchemaError::CategoryOutOfRange {
                name: var.name().to_string(),
                row,
                value,
                arity,
            });
        }
    }
    Ok(())
}
