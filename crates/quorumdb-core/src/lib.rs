//! # quorumdb-core
//!
//! Query execution orchestration for QuorumDB.
//!
//! The [`QueryExecutor`] ties the layer together: sessions hand it query
//! text (ad-hoc or prepared), it compiles against the session's keyspace
//! through the [`SchemaRegistry`], registers prepared statements in the
//! shared [`PreparedStatementCache`], and dispatches data operations to a
//! [`StorageExecutor`] under the caller's consistency level and the
//! configured timeout.
//!
//! Everything the executor touches is injected. Production wires the
//! in-memory registry and a replicated storage engine; tests substitute
//! fault-injecting storage to exercise the timeout and availability paths.

pub mod compression;
pub mod config;
pub mod executor;
pub mod prepared_cache;
pub mod schema_registry;
pub mod storage;

pub use config::ExecutorConfig;
pub use executor::{PreparedResult, QueryExecutor};
pub use prepared_cache::PreparedStatementCache;
pub use schema_registry::{InMemorySchemaRegistry, SchemaRegistry};
pub use storage::{InMemoryStorage, StorageExecutor};
