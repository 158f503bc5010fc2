//! Session context: connection identity plus the active keyspace.

use parking_lot::RwLock;
use quorumdb_commons::KeyspaceName;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next process-unique connection id.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// State owned by one client connection.
///
/// The keyspace slot starts unset and moves to bound on the first successful
/// `USE`/`set_keyspace`; re-binding is always allowed. The connection's own
/// calls are strictly sequential, but the transport may read the session from
/// several tasks, so the slot sits behind a lock. Nothing outside this
/// session ever observes or mutates it — that isolation is what the parallel
/// keyspace tests pin down.
#[derive(Debug)]
pub struct Session {
    connection_id: ConnectionId,
    current_keyspace: RwLock<Option<KeyspaceName>>,
}

impl Session {
    /// Creates a session for a new connection with no keyspace bound.
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            current_keyspace: RwLock::new(None),
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// The session's active keyspace, or `None` when unset.
    pub fn current_keyspace(&self) -> Option<KeyspaceName> {
        self.current_keyspace.read().clone()
    }

    /// Replaces the active keyspace.
    ///
    /// Existence validation happens in the query executor before this is
    /// called; the session itself only stores the binding.
    pub fn bind_keyspace(&self, keyspace: KeyspaceName) {
        *self.current_keyspace.write() = Some(keyspace);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ConnectionId::next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_unset() {
        let session = Session::default();
        assert_eq!(session.current_keyspace(), None);
    }

    #[test]
    fn test_bind_and_rebind() {
        let session = Session::default();
        session.bind_keyspace(KeyspaceName::new("ks1"));
        assert_eq!(session.current_keyspace(), Some(KeyspaceName::new("ks1")));

        session.bind_keyspace(KeyspaceName::new("ks2"));
        assert_eq!(session.current_keyspace(), Some(KeyspaceName::new("ks2")));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let a = Session::default();
        let b = Session::default();
        assert_ne!(a.connection_id(), b.connection_id());

        a.bind_keyspace(KeyspaceName::new("ks1"));
        assert_eq!(b.current_keyspace(), None);
    }

    #[test]
    fn test_connection_ids_unique() {
        let ids: Vec<u64> = (0..100).map(|_| ConnectionId::next().as_u64()).collect();
        let mut dedup = ids.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), ids.len());
    }
}
