//! # quorumdb-session
//!
//! Per-connection session state.
//!
//! A [`Session`] is created by the transport layer when a client connects and
//! destroyed on disconnect. It owns exactly one piece of mutable state: the
//! currently selected keyspace, against which unqualified table references in
//! later queries resolve. Sessions are passed explicitly into every query
//! operation; there is no process-global "current connection".

mod session;

pub use session::{ConnectionId, Session};
