//! Query execution orchestration.
//!
//! `QueryExecutor` is the single entry point for sessions: it parses and
//! compiles query text against the session's keyspace, applies DDL to the
//! schema registry, invalidates dependent prepared statements, and hands
//! data operations to the storage executor under a timeout derived from the
//! configuration. All shared state (registry, storage, prepared cache) is
//! injected, so several executors can share one prepared cache or tests can
//! substitute fault-injecting storage.

use crate::compression;
use crate::config::ExecutorConfig;
use crate::prepared_cache::PreparedStatementCache;
use crate::schema_registry::SchemaRegistry;
use crate::storage::StorageExecutor;
use quorumdb_commons::{
    ColumnSpec, ConsistencyLevel, CqlResult, CqlType, KeyspaceName, PreparedId, QueryError,
    QueryResult,
};
use quorumdb_session::Session;
use quorumdb_sql::{
    bind, compile, parse, BoundStatement, CompiledKind, CompiledStatement, SchemaLookup,
};
use std::sync::Arc;

/// What a caller gets back from `prepare`: the handle plus the metadata it
/// needs to encode bind values and decode result rows.
#[derive(Debug, Clone)]
pub struct PreparedResult {
    pub id: PreparedId,
    pub bind_types: Vec<CqlType>,
    pub result_metadata: Vec<ColumnSpec>,
}

pub struct QueryExecutor {
    registry: Arc<dyn SchemaRegistry>,
    storage: Arc<dyn StorageExecutor>,
    prepared: Arc<PreparedStatementCache>,
    config: ExecutorConfig,
}

impl QueryExecutor {
    pub fn new(
        registry: Arc<dyn SchemaRegistry>,
        storage: Arc<dyn StorageExecutor>,
        prepared: Arc<PreparedStatementCache>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            registry,
            storage,
            prepared,
            config,
        }
    }

    /// The prepared-statement cache this executor registers into.
    pub fn prepared_cache(&self) -> &Arc<PreparedStatementCache> {
        &self.prepared
    }

    /// Binds the session to a keyspace after validating it exists.
    pub fn set_keyspace(&self, session: &Session, keyspace: &KeyspaceName) -> QueryResult<()> {
        if !self.registry.keyspace_exists(keyspace) {
            return Err(QueryError::invalid_request(format!(
                "unknown keyspace '{}'",
                keyspace
            )));
        }
        session.bind_keyspace(keyspace.clone());
        log::debug!("{} bound to keyspace {}", session.connection_id(), keyspace);
        Ok(())
    }

    /// Executes ad-hoc query text on a session.
    ///
    /// Bind markers are rejected here: ad-hoc statements bind zero values, so
    /// any `?` in the text fails the arity check before storage is touched.
    pub async fn execute_query(
        &self,
        session: &Session,
        sql: &str,
        consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        let context = session.current_keyspace();
        let compiled = compile(parse(sql)?, context.as_ref(), self)?;
        self.apply(session, Arc::new(compiled), &[], consistency)
            .await
    }

    /// Executes a raw query payload, inflating it first when it arrives
    /// gzip-compressed.
    pub async fn execute_payload(
        &self,
        session: &Session,
        payload: &[u8],
        consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        let sql = decode_payload(payload)?;
        self.execute_query(session, &sql, consistency).await
    }

    /// Compiles a statement against the session's current keyspace and
    /// registers it process-wide.
    ///
    /// Resolution is fixed at prepare time: the handle keeps targeting the
    /// keyspace that was current on the preparing session, no matter which
    /// session later executes it or what `USE` calls happen in between.
    pub fn prepare_query(&self, session: &Session, sql: &str) -> QueryResult<PreparedResult> {
        let context = session.current_keyspace();
        let compiled = compile(parse(sql)?, context.as_ref(), self)?;
        let compiled = Arc::new(compiled);
        let id = self.prepared.register(Arc::clone(&compiled));
        Ok(PreparedResult {
            id,
            bind_types: compiled.bind_types().to_vec(),
            result_metadata: compiled.result_metadata().to_vec(),
        })
    }

    /// Prepares a raw query payload, inflating it first when it arrives
    /// gzip-compressed.
    pub fn prepare_payload(
        &self,
        session: &Session,
        payload: &[u8],
    ) -> QueryResult<PreparedResult> {
        let sql = decode_payload(payload)?;
        self.prepare_query(session, &sql)
    }

    /// Executes a previously prepared statement with encoded bind values.
    ///
    /// An unknown or invalidated handle fails with [`QueryError::NotPrepared`].
    /// A live handle whose table has since disappeared fails with
    /// [`QueryError::InvalidRequest`].
    pub async fn execute_prepared(
        &self,
        session: &Session,
        id: PreparedId,
        values: &[Vec<u8>],
        consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        let compiled = self
            .prepared
            .lookup(id)
            .ok_or(QueryError::NotPrepared(id))?;

        // Schema may have moved under a live handle.
        if let Some(table) = compiled.table() {
            if !matches!(compiled.kind(), CompiledKind::CreateTable(_))
                && self.registry.table_schema(table).is_none()
            {
                return Err(QueryError::invalid_request(format!(
                    "unknown table '{}'",
                    table
                )));
            }
        }

        self.apply(session, compiled, values, consistency).await
    }

    /// Shared tail of the ad-hoc and prepared paths: exhaustive dispatch on
    /// the compiled statement kind.
    async fn apply(
        &self,
        session: &Session,
        compiled: Arc<CompiledStatement>,
        values: &[Vec<u8>],
        consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        match compiled.kind() {
            CompiledKind::UseKeyspace(keyspace) => {
                let keyspace = keyspace.clone();
                self.set_keyspace(session, &keyspace)?;
                Ok(CqlResult::empty())
            }
            CompiledKind::CreateKeyspace(keyspace) => {
                self.registry.create_keyspace(keyspace)?;
                Ok(CqlResult::empty())
            }
            CompiledKind::DropKeyspace(keyspace) => {
                self.registry.drop_keyspace(keyspace)?;
                self.storage.drop_keyspace(keyspace);
                self.prepared.invalidate_keyspace(keyspace);
                Ok(CqlResult::empty())
            }
            CompiledKind::CreateTable(schema) => {
                self.registry.create_table(schema.clone())?;
                self.storage.create_table(schema);
                Ok(CqlResult::empty())
            }
            CompiledKind::DropTable(table) => {
                self.registry.drop_table(table)?;
                self.storage.drop_table(table);
                self.prepared.invalidate_table(table);
                Ok(CqlResult::empty())
            }
            CompiledKind::Select(_)
            | CompiledKind::Insert(_)
            | CompiledKind::Update(_)
            | CompiledKind::Delete(_) => {
                let bound = bind(Arc::clone(&compiled), values)?;
                self.dispatch(&bound, consistency).await
            }
        }
    }

    /// Runs one storage operation under the configured timeout.
    async fn dispatch(
        &self,
        bound: &BoundStatement,
        consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        let timeout = self.config.request_timeout();
        match tokio::time::timeout(timeout, self.storage.execute(bound, consistency)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!(
                    "storage operation timed out after {:?}: {}",
                    timeout,
                    bound.compiled().source()
                );
                Err(QueryError::timeout(consistency, timeout.as_millis() as u64))
            }
        }
    }
}

/// Inflates a possibly-gzipped payload and checks it is UTF-8 query text.
fn decode_payload(payload: &[u8]) -> QueryResult<String> {
    let bytes;
    let raw = if compression::is_gzip(payload) {
        bytes = compression::decompress(payload)?;
        &bytes
    } else {
        payload
    };
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| QueryError::syntax("query text is not valid UTF-8"))
}

/// The executor reads schemas through its registry, so it can stand in as
/// the compiler's lookup seam directly.
impl SchemaLookup for QueryExecutor {
    fn keyspace_exists(&self, keyspace: &KeyspaceName) -> bool {
        self.registry.keyspace_exists(keyspace)
    }

    fn table_schema(
        &self,
        table: &quorumdb_commons::QualifiedTable,
    ) -> Option<Arc<quorumdb_commons::TableSchema>> {
        self.registry.table_schema(table)
    }
}
