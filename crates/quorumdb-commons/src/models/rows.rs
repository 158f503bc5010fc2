//! Query result model.
//!
//! A result is an ordered sequence of rows whose column order is fixed by the
//! result metadata. Row content is exactly what the storage executor
//! returned; this layer never re-sorts, filters or deduplicates.

use crate::models::schemas::ColumnSpec;
use crate::models::values::CqlValue;
use serde::{Deserialize, Serialize};

/// One result row: values aligned positionally with the result metadata.
///
/// A `None` entry is an unset column (inserted rows need not populate every
/// column of the table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    values: Vec<Option<CqlValue>>,
}

impl Row {
    pub fn new(values: Vec<Option<CqlValue>>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Option<CqlValue>] {
        &self.values
    }

    /// Value at a column position.
    pub fn get(&self, index: usize) -> Option<&CqlValue> {
        self.values.get(index).and_then(|v| v.as_ref())
    }
}

/// An ordered set of rows plus the metadata fixing their column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CqlResult {
    metadata: Vec<ColumnSpec>,
    rows: Vec<Row>,
}

impl CqlResult {
    pub fn new(metadata: Vec<ColumnSpec>, rows: Vec<Row>) -> Self {
        Self { metadata, rows }
    }

    /// Empty acknowledgement result, used for DDL and DML completions.
    pub fn empty() -> Self {
        Self {
            metadata: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn metadata(&self) -> &[ColumnSpec] {
        &self.metadata
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of a named column in a given row, resolved through the metadata.
    pub fn value(&self, row: usize, column: &str) -> Option<&CqlValue> {
        let idx = self.metadata.iter().position(|c| c.name == column)?;
        self.rows.get(row)?.get(idx)
    }
}
