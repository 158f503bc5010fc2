//! Process-wide registry of prepared statements.
//!
//! One cache instance is shared by every session: a statement prepared on one
//! connection is executable from any other. Handles are assigned from a
//! monotonic counter and never reused, so after an entry is invalidated its
//! handle stays dead forever and lookups on it deterministically fail.

use dashmap::DashMap;
use quorumdb_commons::{KeyspaceName, PreparedId, QualifiedTable};
use quorumdb_sql::CompiledStatement;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PreparedStatementCache {
    statements: DashMap<PreparedId, Arc<CompiledStatement>>,
    next_id: AtomicI32,
}

impl PreparedStatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compiled statement and returns its fresh handle.
    pub fn register(&self, statement: Arc<CompiledStatement>) -> PreparedId {
        let id = PreparedId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        log::debug!("prepared statement {} -> {}", id, statement.source());
        self.statements.insert(id, statement);
        id
    }

    pub fn lookup(&self, id: PreparedId) -> Option<Arc<CompiledStatement>> {
        self.statements.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Removes every statement compiled against the given table.
    pub fn invalidate_table(&self, table: &QualifiedTable) {
        self.statements
            .retain(|_, statement| statement.table() != Some(table));
    }

    /// Removes every statement resolved against the given keyspace.
    pub fn invalidate_keyspace(&self, keyspace: &KeyspaceName) {
        self.statements
            .retain(|_, statement| statement.keyspace() != Some(keyspace));
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
