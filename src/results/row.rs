use std::collections::HashMap;
use std::sync::Arc;

use crate::record::Record;
use crate::types::RowValues;

/// A row from a query result.
///
/// Column names and the name-to-index map are shared by every row of a [`ResultSet`].
///
/// [`ResultSet`]: super::ResultSet
#[derive(Debug, Clone)]
pub struct ResultRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index: Arc<HashMap<String, usize>>,
}

impl ResultRow {
    /// Create a row, building its own column index.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let column_index = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    /// Convert the row back into a record of text columns. NULL and blob cells are skipped.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        for (name, value) in self.column_names.iter().zip(&self.values) {
            if let Some(text) = value.to_record_string() {
                record.column(name.clone(), text);
            }
        }
        record
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        // first occurrence wins for duplicate column names
        index.entry(name.clone()).or_insert(i);
    }
    index
}
