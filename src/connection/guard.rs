// src/connection/guard.rs

//! Defines `ConnectionGuard`, an RAII guard for connection resource management.

use crate::core::state::{ConnectionId, ServerState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Releases a connection's server-side state when the handler's scope is
/// exited, however it is exited.
pub struct ConnectionGuard {
    state: Arc<ServerState>,
    session_id: ConnectionId,
    addr: SocketAddr,
}

impl ConnectionGuard {
    pub fn new(state: Arc<ServerState>, session_id: ConnectionId, addr: SocketAddr) -> Self {
        Self {
            state,
            session_id,
            addr,
        }
    }
}

impl Drop for ConnectionGuard {
    /// Drops the connection's auth entry and every subscription it holds.
    fn drop(&mut self) {
        debug!(
            "ConnectionGuard dropping, cleaning up resources for connection {}",
            self.addr
        );
        self.state.disconnect(self.session_id);
    }
}
