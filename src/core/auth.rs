// src/core/auth.rs

//! Per-connection authentication state.
//!
//! A connection starts unauthenticated and becomes authenticated after
//! presenting the shared password. There is no way back other than
//! disconnecting, which removes the entry altogether.

use crate::core::state::ConnectionId;
use dashmap::DashMap;

#[derive(Debug)]
pub struct AuthGate {
    password: String,
    sessions: DashMap<ConnectionId, bool>,
}

impl AuthGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            sessions: DashMap::new(),
        }
    }

    /// Returns whether `conn` has authenticated, creating an unauthenticated
    /// entry on first sight.
    pub fn is_authenticated(&self, conn: ConnectionId) -> bool {
        *self.sessions.entry(conn).or_insert(false)
    }

    /// Checks `candidate` against the configured password. On success the
    /// connection is marked authenticated; on failure its state is untouched.
    pub fn authenticate(&self, conn: ConnectionId, candidate: &[u8]) -> bool {
        if candidate != self.password.as_bytes() {
            return false;
        }
        self.sessions.insert(conn, true);
        true
    }

    /// Forgets everything about `conn`.
    pub fn remove(&self, conn: ConnectionId) {
        self.sessions.remove(&conn);
    }

    /// Number of connections currently tracked.
    pub fn tracked(&self) -> usize {
        self.sessions.len()
    }
}
