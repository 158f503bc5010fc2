//! Shared error taxonomy for the query execution layer.
//!
//! Every failure surfaced to a caller is one of five kinds: a syntax error in
//! the query text, an invalid request (unknown keyspace/table, bad bind
//! variables, unset keyspace), an unknown prepared-statement handle, a
//! consistency timeout, or insufficient live replicas. Errors are propagated
//! directly; this layer performs no retries and no suppression.

use crate::consistency::ConsistencyLevel;
use crate::PreparedId;
use thiserror::Error;

/// Result type alias using [`QueryError`].
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Error type for all query-layer operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Malformed query text.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Unknown keyspace/table/column, bind-variable mismatch, or a required
    /// keyspace that was never set on the session.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The handle was never issued, or its entry was invalidated by a schema
    /// change.
    #[error("No prepared statement with handle {0}")]
    NotPrepared(PreparedId),

    /// The storage layer did not gather the acknowledgements implied by the
    /// consistency level within the configured bound.
    #[error("Operation timed out at consistency {consistency} after {elapsed_ms}ms")]
    Timeout {
        consistency: ConsistencyLevel,
        elapsed_ms: u64,
    },

    /// Not enough replicas were reachable to even attempt the operation.
    #[error("Cannot achieve consistency {consistency}: {alive} of {required} replicas alive")]
    Unavailable {
        consistency: ConsistencyLevel,
        required: usize,
        alive: usize,
    },
}

impl QueryError {
    /// Creates a syntax error with a message.
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }

    /// Creates an invalid-request error with a message.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates a timeout error for the given consistency level.
    pub fn timeout(consistency: ConsistencyLevel, elapsed_ms: u64) -> Self {
        Self::Timeout {
            consistency,
            elapsed_ms,
        }
    }

    /// Creates an unavailable error for the given consistency level.
    pub fn unavailable(consistency: ConsistencyLevel, required: usize, alive: usize) -> Self {
        Self::Unavailable {
            consistency,
            required,
            alive,
        }
    }

    /// True for the two storage-availability failures (`Timeout`, `Unavailable`).
    pub fn is_availability_error(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable { .. })
    }
}
