//! Table schema model.
//!
//! The schema registry is the authoritative owner of these; the compiler
//! reads them to resolve columns and the storage engine reads them to key
//! rows. A table has exactly one primary-key column in this layer.

use crate::models::datatypes::CqlType;
use crate::models::names::QualifiedTable;
use serde::{Deserialize, Serialize};

/// One column of a table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: CqlType,
    pub primary_key: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: CqlType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
        }
    }

    pub fn primary_key(name: impl Into<String>, data_type: CqlType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: true,
        }
    }
}

/// Full definition of a table: qualified name plus ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: QualifiedTable,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn new(table: QualifiedTable, columns: Vec<ColumnDefinition>) -> Self {
        Self { table, columns }
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The primary-key column.
    ///
    /// Schemas are validated on creation, so exactly one column carries the
    /// flag by the time a schema is visible through the registry.
    pub fn primary_key_column(&self) -> &ColumnDefinition {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .expect("schema has a primary key column")
    }

    /// Result metadata covering every column, in schema order.
    pub fn all_column_specs(&self) -> Vec<ColumnSpec> {
        self.columns
            .iter()
            .map(|c| ColumnSpec::new(c.name.clone(), c.data_type))
            .collect()
    }
}

/// Name and type of one result column, in result order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: CqlType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: CqlType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}
