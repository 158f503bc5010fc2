//! Schema registry: the authoritative, process-wide catalog of keyspaces and
//! tables.
//!
//! The registry extends the compiler's read-only [`SchemaLookup`] with the
//! mutations DDL performs. Mutations are serialized per entry by the
//! concurrent map; there is no global lock.

use dashmap::{DashMap, DashSet};
use quorumdb_commons::{
    KeyspaceName, QualifiedTable, QueryError, QueryResult, TableName, TableSchema,
};
use quorumdb_sql::SchemaLookup;
use std::sync::Arc;

/// Mutable catalog operations layered on top of [`SchemaLookup`].
pub trait SchemaRegistry: SchemaLookup {
    fn create_keyspace(&self, keyspace: &KeyspaceName) -> QueryResult<()>;

    /// Drops a keyspace together with every table defined in it.
    fn drop_keyspace(&self, keyspace: &KeyspaceName) -> QueryResult<()>;

    fn create_table(&self, schema: TableSchema) -> QueryResult<()>;

    fn drop_table(&self, table: &QualifiedTable) -> QueryResult<()>;
}

/// In-memory registry backed by concurrent maps.
#[derive(Debug, Default)]
pub struct InMemorySchemaRegistry {
    keyspaces: DashSet<KeyspaceName>,
    tables: DashMap<QualifiedTable, Arc<TableSchema>>,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All tables currently defined in a keyspace.
    pub fn tables_in(&self, keyspace: &KeyspaceName) -> Vec<TableName> {
        self.tables
            .iter()
            .filter(|entry| entry.key().keyspace == *keyspace)
            .map(|entry| entry.key().table.clone())
            .collect()
    }
}

impl SchemaLookup for InMemorySchemaRegistry {
    fn keyspace_exists(&self, keyspace: &KeyspaceName) -> bool {
        self.keyspaces.contains(keyspace)
    }

    fn table_schema(&self, table: &QualifiedTable) -> Option<Arc<TableSchema>> {
        self.tables.get(table).map(|entry| Arc::clone(entry.value()))
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn create_keyspace(&self, keyspace: &KeyspaceName) -> QueryResult<()> {
        if !self.keyspaces.insert(keyspace.clone()) {
            return Err(QueryError::invalid_request(format!(
                "keyspace '{}' already exists",
                keyspace
            )));
        }
        log::info!("created keyspace {}", keyspace);
        Ok(())
    }

    fn drop_keyspace(&self, keyspace: &KeyspaceName) -> QueryResult<()> {
        if self.keyspaces.remove(keyspace).is_none() {
            return Err(QueryError::invalid_request(format!(
                "unknown keyspace '{}'",
                keyspace
            )));
        }
        let dropped = self.tables_in(keyspace);
        for table in &dropped {
            self.tables
                .remove(&QualifiedTable::new(keyspace.clone(), table.clone()));
        }
        log::info!("dropped keyspace {} ({} tables)", keyspace, dropped.len());
        Ok(())
    }

    fn create_table(&self, schema: TableSchema) -> QueryResult<()> {
        if !self.keyspaces.contains(&schema.table.keyspace) {
            return Err(QueryError::invalid_request(format!(
                "unknown keyspace '{}'",
                schema.table.keyspace
            )));
        }
        let table = schema.table.clone();
        match self.tables.entry(table.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(QueryError::invalid_request(
                format!("table '{}' already exists", table),
            )),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(schema));
                log::info!("created table {}", table);
                Ok(())
            }
        }
    }

    fn drop_table(&self, table: &QualifiedTable) -> QueryResult<()> {
        if self.tables.remove(table).is_none() {
            return Err(QueryError::invalid_request(format!(
                "unknown table '{}'",
                table
            )));
        }
        log::info!("dropped table {}", table);
        Ok(())
    }
}
