// src/core/state/core.rs

//! Defines the shared `ServerState` and its construction.

use super::ConnectionId;
use super::stats::StatsState;
use crate::config::Config;
use crate::core::auth::AuthGate;
use crate::core::bridge::StreamBridge;
use crate::core::catalog;
use crate::core::commands::console::ConsoleCommand;
use crate::core::commands::generic::{Auth, CommandInfo, Ping, Subscribe};
use crate::core::handler::CommandRegistry;
use crate::core::pubsub::PubSubManager;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Everything produced by initialization that the task spawner consumes.
pub struct ServerInit {
    /// The fully initialized, shared server state.
    pub state: Arc<ServerState>,
    /// Receives captured process output for the pub/sub forwarder.
    pub output_rx: mpsc::Receiver<Bytes>,
}

/// The central struct holding all shared, server-wide state. It is wrapped in
/// an `Arc` and handed to every connection handler and background task.
#[derive(Debug)]
pub struct ServerState {
    pub registry: CommandRegistry,
    pub auth: AuthGate,
    pub pubsub: PubSubManager,
    pub bridge: Arc<StreamBridge>,
    /// The channel process output is published on.
    pub output_channel: Bytes,
    pub stats: StatsState,
}

impl ServerState {
    /// Builds the state around an existing bridge and registers every verb:
    /// the built-ins are open to everyone, catalog verbs require AUTH.
    pub fn new(
        password: impl Into<String>,
        bridge: Arc<StreamBridge>,
        output_channel: impl Into<Bytes>,
    ) -> Self {
        let output_channel = output_channel.into();

        let mut registry = CommandRegistry::new();
        registry.register(Auth, false);
        registry.register(Ping, false);
        registry.register(CommandInfo, false);
        registry.register(Subscribe::new(output_channel.clone()), false);
        for entry in catalog::canonical_entries() {
            registry.register(ConsoleCommand::new(&entry), true);
        }
        debug!(commands = registry.len(), "Command registry built");

        Self {
            registry,
            auth: AuthGate::new(password),
            pubsub: PubSubManager::new(),
            bridge,
            output_channel,
            stats: StatsState::new(),
        }
    }

    /// Creates the bridge and the state from the resolved configuration.
    pub fn initialize(config: &Config) -> ServerInit {
        let (bridge, output_rx) = StreamBridge::new(config.output.capacity);
        let state = Arc::new(Self::new(
            config.password.clone(),
            bridge,
            config.output.channel.clone(),
        ));
        info!(
            commands = state.registry.len(),
            channel = %config.output.channel,
            "Server state initialized"
        );
        ServerInit { state, output_rx }
    }

    /// Records a new connection. There is no connection limit, so every
    /// connection is admitted.
    pub fn connect(&self, id: ConnectionId, addr: SocketAddr) -> bool {
        self.stats.client_connected();
        debug!(session_id = id, %addr, "Client registered");
        true
    }

    /// Releases everything held on behalf of `id`.
    pub fn disconnect(&self, id: ConnectionId) {
        self.auth.remove(id);
        let dropped = self.pubsub.remove_connection(id);
        self.stats.client_disconnected();
        debug!(session_id = id, subscriptions = dropped, "Client unregistered");
    }

    /// Publishes one chunk of process output to the output channel and
    /// returns how many subscribers received it.
    pub fn publish_output(&self, chunk: Bytes) -> usize {
        self.pubsub.publish(&self.output_channel, chunk)
    }
}
