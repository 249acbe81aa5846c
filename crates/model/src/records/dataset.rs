use crate::{
    core::{identifiers::normalize_label, value::Value},
    errors::DatasetError,
};
use std::collections::HashSet;

/// An in-memory table read from a CSV file: ordered columns, ordered rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(name: &str, columns: Vec<String>) -> Self {
        Dataset {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with nulls.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        if row.len() < self.columns.len() {
            row.resize(self.columns.len(), Value::Null);
        }
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Rewrites every value of `column` in place. Returns `false` when the
    /// column does not exist.
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> bool
    where
        F: FnMut(Value) -> Value,
    {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        for row in &mut self.rows {
            let value = std::mem::replace(&mut row[idx], Value::Null);
            row[idx] = f(value);
        }
        true
    }

    pub fn normalize_columns(&mut self) -> Result<(), DatasetError> {
        let renamed = self
            .columns
            .iter()
            .map(|c| normalize_label(c))
            .collect::<Vec<_>>();

        unique_columns(&self.name, &renamed)?;
        self.columns = renamed;
        Ok(())
    }

    /// Rejects headers that repeat a label as-is.
    pub fn check_unique_columns(&self) -> Result<(), DatasetError> {
        unique_columns(&self.name, &self.columns)
    }

    /// Distinct non-null values of a column in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Option<Vec<Value>> {
        let mut seen = HashSet::new();
        let values = self
            .column_values(column)?
            .filter(|v| !v.is_null())
            .filter(|v| seen.insert(v.to_string()))
            .cloned()
            .collect();
        Some(values)
    }

    pub fn null_count(&self, column: &str) -> Option<usize> {
        Some(self.column_values(column)?.filter(|v| v.is_null()).count())
    }

    pub fn sum(&self, column: &str) -> Option<f64> {
        Some(self.column_values(column)?.filter_map(Value::as_f64).sum())
    }

    pub fn count_equal(&self, column: &str, expected: &str) -> Option<usize> {
        Some(
            self.column_values(column)?
                .filter(|v| v.as_string().as_deref() == Some(expected))
                .count(),
        )
    }
}

fn unique_columns(dataset: &str, columns: &[String]) -> Result<(), DatasetError> {
    let mut seen = HashSet::with_capacity(columns.len());
    match columns.iter().find(|c| !seen.insert(c.as_str())) {
        Some(column) => Err(DatasetError::DuplicateColumn {
            dataset: dataset.to_string(),
            column: column.clone(),
        }),
        None => Ok(()),
    }
}
