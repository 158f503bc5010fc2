//! # quorumdb-commons
//!
//! Shared models and error types for QuorumDB's query execution layer.
//!
//! This crate provides:
//! - Validated identifier newtypes ([`KeyspaceName`], [`TableName`], [`QualifiedTable`])
//! - The CQL type system and binary value codec ([`CqlType`], [`CqlValue`])
//! - Table schemas and result model ([`TableSchema`], [`Row`], [`CqlResult`])
//! - [`ConsistencyLevel`] and [`PreparedId`]
//! - The [`QueryError`] taxonomy shared by every crate in the workspace
//!
//! Types live here so that producer crates (`quorumdb-sql`) and consumer
//! crates (`quorumdb-core`) can reference them without depending on each
//! other.

pub mod consistency;
pub mod errors;
pub mod models;

pub use consistency::ConsistencyLevel;
pub use errors::{QueryError, QueryResult};
pub use models::datatypes::CqlType;
pub use models::names::{KeyspaceName, NameValidationError, QualifiedTable, TableName};
pub use models::rows::{CqlResult, Row};
pub use models::schemas::{ColumnDefinition, ColumnSpec, TableSchema};
pub use models::values::{CqlValue, ValueCodecError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle identifying a prepared statement for the lifetime of the process.
///
/// Handles are assigned monotonically by the prepared statement cache and are
/// never reused, so a stale handle can always be distinguished from one that
/// was never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PreparedId(i32);

impl PreparedId {
    #[inline]
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for PreparedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
