//! Shared harness for the executor integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use quorumdb_commons::{
    ConsistencyLevel, CqlResult, KeyspaceName, QualifiedTable, QueryError, QueryResult,
    TableSchema,
};
use quorumdb_core::{
    ExecutorConfig, InMemorySchemaRegistry, InMemoryStorage, PreparedStatementCache,
    QueryExecutor, StorageExecutor,
};
use quorumdb_session::Session;
use quorumdb_sql::BoundStatement;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Executor over fresh in-memory state.
pub fn executor() -> Arc<QueryExecutor> {
    executor_with_storage(Arc::new(InMemoryStorage::new()), ExecutorConfig::default())
}

/// Executor over the given storage, for fault injection.
pub fn executor_with_storage(
    storage: Arc<dyn StorageExecutor>,
    config: ExecutorConfig,
) -> Arc<QueryExecutor> {
    executor_with_parts(storage, config).0
}

/// Like [`executor_with_storage`], but also hands back the registry so a test
/// can mutate the schema behind the executor's back.
pub fn executor_with_parts(
    storage: Arc<dyn StorageExecutor>,
    config: ExecutorConfig,
) -> (Arc<QueryExecutor>, Arc<InMemorySchemaRegistry>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let registry = Arc::new(InMemorySchemaRegistry::new());
    let executor = Arc::new(QueryExecutor::new(
        registry.clone(),
        storage,
        Arc::new(PreparedStatementCache::new()),
        config,
    ));
    (executor, registry)
}

/// Runs a statement at consistency ONE, panicking on failure.
pub async fn run(executor: &QueryExecutor, session: &Session, sql: &str) -> CqlResult {
    executor
        .execute_query(session, sql, ConsistencyLevel::One)
        .await
        .unwrap_or_else(|e| panic!("'{}' failed: {}", sql, e))
}

/// Creates a keyspace with a `test (id text PRIMARY KEY, num int)` table and
/// binds the session to it.
pub async fn bootstrap_keyspace(executor: &QueryExecutor, session: &Session, keyspace: &str) {
    run(executor, session, &format!("CREATE KEYSPACE {}", keyspace)).await;
    run(executor, session, &format!("USE {}", keyspace)).await;
    run(
        executor,
        session,
        "CREATE TABLE test (id text PRIMARY KEY, num int)",
    )
    .await;
}

/// Storage wrapper counting data operations, to pin down which failures
/// reach storage at all.
pub struct CountingStorage {
    inner: InMemoryStorage,
    operations: AtomicUsize,
}

impl CountingStorage {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStorage::new(),
            operations: AtomicUsize::new(0),
        }
    }

    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageExecutor for CountingStorage {
    async fn execute(
        &self,
        statement: &BoundStatement,
        consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(statement, consistency).await
    }

    fn create_table(&self, schema: &TableSchema) {
        self.inner.create_table(schema);
    }

    fn drop_table(&self, table: &QualifiedTable) {
        self.inner.drop_table(table);
    }

    fn drop_keyspace(&self, keyspace: &KeyspaceName) {
        self.inner.drop_keyspace(keyspace);
    }
}

/// Storage that never completes a data operation.
pub struct StalledStorage;

#[async_trait]
impl StorageExecutor for StalledStorage {
    async fn execute(
        &self,
        _statement: &BoundStatement,
        _consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(CqlResult::empty())
    }

    fn create_table(&self, _schema: &TableSchema) {}
    fn drop_table(&self, _table: &QualifiedTable) {}
    fn drop_keyspace(&self, _keyspace: &KeyspaceName) {}
}

/// Storage with too few live replicas for any consistency level.
pub struct UnavailableStorage {
    pub required: usize,
    pub alive: usize,
}

#[async_trait]
impl StorageExecutor for UnavailableStorage {
    async fn execute(
        &self,
        _statement: &BoundStatement,
        consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        Err(QueryError::unavailable(
            consistency,
            self.required,
            self.alive,
        ))
    }

    fn create_table(&self, _schema: &TableSchema) {}
    fn drop_table(&self, _table: &QualifiedTable) {}
    fn drop_keyspace(&self, _keyspace: &KeyspaceName) {}
}
