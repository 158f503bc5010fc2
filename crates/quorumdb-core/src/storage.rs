//! Storage executor seam and the in-memory reference engine.
//!
//! The orchestrator hands every data operation to a [`StorageExecutor`]
//! together with the caller's consistency level. The trait is the
//! replication boundary: a distributed implementation coordinates replicas
//! and surfaces [`QueryError::Timeout`] / [`QueryError::Unavailable`]; the
//! in-memory engine here executes locally and treats every consistency level
//! as trivially satisfied.

use async_trait::async_trait;
use dashmap::DashMap;
use quorumdb_commons::{
    ConsistencyLevel, CqlResult, CqlValue, KeyspaceName, QualifiedTable, QueryError, QueryResult,
    Row, TableSchema,
};
use quorumdb_sql::{BoundStatement, CompiledInsert, CompiledKind, CompiledSelect, CompiledUpdate};
use std::collections::{BTreeMap, HashMap};

/// Executes bound data statements under a consistency level.
#[async_trait]
pub trait StorageExecutor: Send + Sync {
    /// Executes a bound SELECT / INSERT / UPDATE / DELETE.
    async fn execute(
        &self,
        statement: &BoundStatement,
        consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult>;

    /// Allocates storage for a newly created table.
    fn create_table(&self, schema: &TableSchema);

    /// Releases storage held by a dropped table.
    fn drop_table(&self, table: &QualifiedTable);

    /// Releases storage held by every table of a dropped keyspace.
    fn drop_keyspace(&self, keyspace: &KeyspaceName);
}

/// One stored row: column name to value.
type StoredRow = HashMap<String, CqlValue>;

/// Rows of one table, keyed by the primary key's order-preserving
/// [`sort_key`](CqlValue::sort_key) encoding, so iteration yields primary-key
/// order even for signed and floating-point keys.
type TableRows = BTreeMap<Vec<u8>, StoredRow>;

/// Single-node in-memory engine.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: DashMap<QualifiedTable, TableRows>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn project(metadata_rows: &mut Vec<Row>, statement: &BoundStatement, stored: &StoredRow) {
        let row = statement
            .compiled()
            .result_metadata()
            .iter()
            .map(|spec| stored.get(&spec.name).cloned())
            .collect();
        metadata_rows.push(Row::new(row));
    }

    fn select(&self, statement: &BoundStatement, select: &CompiledSelect) -> QueryResult<CqlResult> {
        let table = self.tables.get(&select.table).ok_or_else(|| {
            QueryError::invalid_request(format!("unknown table '{}'", select.table))
        })?;

        let mut rows = Vec::new();
        match &select.restriction {
            Some(restriction) => {
                let key = statement.value_of(&restriction.value)?.sort_key();
                if let Some(stored) = table.get(&key) {
                    Self::project(&mut rows, statement, stored);
                }
            }
            None => {
                for stored in table.values() {
                    Self::project(&mut rows, statement, stored);
                }
            }
        }

        Ok(CqlResult::new(
            statement.compiled().result_metadata().to_vec(),
            rows,
        ))
    }

    fn insert(&self, statement: &BoundStatement, insert: &CompiledInsert) -> QueryResult<CqlResult> {
        let pk_name = insert.schema.primary_key_column().name.clone();

        let mut values = HashMap::with_capacity(insert.columns.len());
        for (column, term) in insert.columns.iter().zip(&insert.values) {
            values.insert(column.clone(), statement.value_of(term)?);
        }
        let key = values
            .get(&pk_name)
            .ok_or_else(|| {
                QueryError::invalid_request(format!("primary key '{}' not set", pk_name))
            })?
            .sort_key();

        let mut table = self.tables.get_mut(&insert.table).ok_or_else(|| {
            QueryError::invalid_request(format!("unknown table '{}'", insert.table))
        })?;
        // Writes are upserts: an INSERT on an existing key merges column-wise.
        table.entry(key).or_default().extend(values);
        Ok(CqlResult::empty())
    }

    fn update(&self, statement: &BoundStatement, update: &CompiledUpdate) -> QueryResult<CqlResult> {
        let pk_value = statement.value_of(&update.restriction.value)?;
        let key = pk_value.sort_key();

        let mut assigned = Vec::with_capacity(update.assignments.len());
        for (column, term) in &update.assignments {
            assigned.push((column.clone(), statement.value_of(term)?));
        }

        let mut table = self.tables.get_mut(&update.table).ok_or_else(|| {
            QueryError::invalid_request(format!("unknown table '{}'", update.table))
        })?;
        // UPDATE is an upsert too: an absent row is created from the
        // restriction's key plus the assignments.
        let row = table.entry(key).or_default();
        row.insert(update.restriction.column.clone(), pk_value);
        for (column, value) in assigned {
            row.insert(column, value);
        }
        Ok(CqlResult::empty())
    }

    fn execute_sync(&self, statement: &BoundStatement) -> QueryResult<CqlResult> {
        match statement.compiled().kind() {
            CompiledKind::Select(select) => self.select(statement, select),
            CompiledKind::Insert(insert) => self.insert(statement, insert),
            CompiledKind::Update(update) => self.update(statement, update),
            CompiledKind::Delete(delete) => {
                let key = statement.value_of(&delete.restriction.value)?.sort_key();
                let mut table = self.tables.get_mut(&delete.table).ok_or_else(|| {
                    QueryError::invalid_request(format!("unknown table '{}'", delete.table))
                })?;
                table.remove(&key);
                Ok(CqlResult::empty())
            }
            other => Err(QueryError::invalid_request(format!(
                "statement is not executable by storage: {:?}",
                other
            ))),
        }
    }
}

#[async_trait]
impl StorageExecutor for InMemoryStorage {
    async fn execute(
        &self,
        statement: &BoundStatement,
        _consistency: ConsistencyLevel,
    ) -> QueryResult<CqlResult> {
        self.execute_sync(statement)
    }

    fn create_table(&self, schema: &TableSchema) {
        self.tables.insert(schema.table.clone(), TableRows::new());
    }

    fn drop_table(&self, table: &QualifiedTable) {
        self.tables.remove(table);
    }

    fn drop_keyspace(&self, keyspace: &KeyspaceName) {
        self.tables.retain(|table, _| table.keyspace != *keyspace);
    }
}
