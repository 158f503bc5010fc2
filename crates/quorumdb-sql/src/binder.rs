//! Bind-variable binding for compiled statements.
//!
//! Binding is the last step before execution: the caller supplies one raw
//! encoded value per bind marker, each value is decoded under the marker's
//! declared type, and the result pairs the compiled statement with its
//! concrete values. Binding never touches storage, so a malformed request
//! fails before any row is read or written.

use crate::compiler::{CompiledStatement, ResolvedTerm};
use quorumdb_commons::{CqlValue, QueryError, QueryResult};
use std::sync::Arc;

/// A compiled statement paired with decoded values for its bind markers.
#[derive(Debug, Clone)]
pub struct BoundStatement {
    compiled: Arc<CompiledStatement>,
    bind_values: Vec<CqlValue>,
}

impl BoundStatement {
    pub fn compiled(&self) -> &CompiledStatement {
        &self.compiled
    }

    pub fn bind_values(&self) -> &[CqlValue] {
        &self.bind_values
    }

    /// Resolves a term to its concrete value.
    ///
    /// Marker indices were assigned by the compiler against the same
    /// statement, so they are always in range once binding has succeeded.
    pub fn value_of(&self, term: &ResolvedTerm) -> QueryResult<CqlValue> {
        match term {
            ResolvedTerm::Value(value) => Ok(value.clone()),
            ResolvedTerm::BindMarker(index) => {
                self.bind_values.get(*index).cloned().ok_or_else(|| {
                    QueryError::invalid_request(format!(
                        "bind marker {} out of range for {} bound value(s)",
                        index,
                        self.bind_values.len()
                    ))
                })
            }
        }
    }
}

/// Binds raw encoded values to a compiled statement's markers.
///
/// Fails with [`QueryError::InvalidRequest`] when the value count does not
/// match the marker count or a value does not decode under its declared
/// type. An ad-hoc statement binds with an empty slice, which is how a `?`
/// in un-prepared query text gets rejected.
pub fn bind(
    compiled: Arc<CompiledStatement>,
    raw_values: &[Vec<u8>],
) -> QueryResult<BoundStatement> {
    let bind_types = compiled.bind_types();
    if raw_values.len() != bind_types.len() {
        return Err(QueryError::invalid_request(format!(
            "expected {} bind value(s), got {}",
            bind_types.len(),
            raw_values.len()
        )));
    }

    let mut bind_values = Vec::with_capacity(raw_values.len());
    for (index, (data_type, raw)) in bind_types.iter().zip(raw_values).enumerate() {
        let value = CqlValue::decode(*data_type, raw).map_err(|e| {
            QueryError::invalid_request(format!("bind value {}: {}", index, e))
        })?;
        bind_values.push(value);
    }

    Ok(BoundStatement {
        compiled,
        bind_values,
    })
}
