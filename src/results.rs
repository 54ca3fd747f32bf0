use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SqlMapperError;
use crate::types::RowValues;

/// A single row from a query result.
///
/// Column names are shared across all rows of one result via `Arc`, with a
/// name-to-index cache to avoid repeated string comparisons. Access by name
/// distinguishes "no such column" (an error) from "column is SQL NULL"
/// (`RowValues::Null`).
#[derive(Debug, Clone)]
pub struct ResultRow {
    /// The column names for this row (shared across all rows in a result)
    column_names: Arc<Vec<String>>,
    /// The values for this row, in column order
    values: Vec<RowValues>,
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl ResultRow {
    /// Create a row over a shared set of column names.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let cache = Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );
        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    /// The ordered column names of this row.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of columns in this row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    /// Get the index of a column by name.
    #[must_use]
    pub fn column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value by column name.
    ///
    /// # Errors
    ///
    /// Returns `SqlMapperError::MissingColumn` if the row has no column with
    /// that name. A NULL column instead yields `Ok(&RowValues::Null)`.
    pub fn get(&self, column_name: &str) -> Result<&RowValues, SqlMapperError> {
        self.get_opt(column_name)
            .ok_or_else(|| SqlMapperError::MissingColumn(column_name.to_string()))
    }

    /// Get a value by column name, or `None` if the column is absent.
    #[must_use]
    pub fn get_opt(&self, column_name: &str) -> Option<&RowValues> {
        let idx = self.column_index(column_name)?;
        self.values.get(idx)
    }

    /// Get a value by column index, or `None` if out of bounds.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    /// Consume the row, yielding its values in column order.
    #[must_use]
    pub fn into_values(self) -> Vec<RowValues> {
        self.values
    }

    /// Iterate `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
