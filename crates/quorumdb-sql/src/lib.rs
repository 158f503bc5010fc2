//! # quorumdb-sql
//!
//! Statement parsing and compilation for QuorumDB's query execution layer.
//!
//! The pipeline is `parse` then `compile`: parsing turns query text into a
//! [`CqlStatement`] (a closed set of statement variants) and knows nothing
//! about schemas; compilation resolves unqualified table references against a
//! context keyspace, validates every referenced object through a
//! [`SchemaLookup`], coerces literals against declared column types, and
//! numbers the bind markers. The result is an immutable
//! [`CompiledStatement`] ready for binding and execution.
//!
//! Only the execution-orchestration subset of the grammar is implemented;
//! the full query language is out of scope for this layer.

pub mod binder;
pub mod compiler;
pub mod parser;
pub mod statement;

pub use binder::{bind, BoundStatement};
pub use compiler::{
    compile, CompiledDelete, CompiledInsert, CompiledKind, CompiledRestriction, CompiledSelect,
    CompiledStatement, CompiledUpdate, Projection, ResolvedTerm, SchemaLookup,
};
pub use parser::parse;
pub use statement::{CqlStatement, CqlStatementKind};
