// src/core/state/stats.rs

//! Server-wide counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Holds the server-wide connection and command counters.
#[derive(Debug, Default)]
pub struct StatsState {
    /// Connections accepted since startup.
    total_connections: AtomicU64,
    /// Connections currently open.
    connected_clients: AtomicU64,
    /// Commands dispatched since startup, including rejected ones.
    total_commands: AtomicU64,
}

impl StatsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_connected(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.connected_clients.fetch_add(1, Ordering::Relaxed);
    }

    pub fn client_disconnected(&self) {
        // Saturate rather than wrap if a disconnect is ever reported twice.
        let _ = self
            .connected_clients
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn get_total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    pub fn get_connected_clients(&self) -> u64 {
        self.connected_clients.load(Ordering::Relaxed)
    }

    pub fn increment_total_commands(&self) {
        self.total_commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_total_commands(&self) -> u64 {
        self.total_commands.load(Ordering::Relaxed)
    }
}
