// tests/integration/test_helpers.rs

//! Test helpers and utilities for integration tests

#![allow(dead_code)]

use bytes::Bytes;
use craftbridge::connection::SessionState;
use craftbridge::core::bridge::StreamBridge;
use craftbridge::core::handler::Dispatcher;
use craftbridge::core::state::{ConnectionId, ServerState};
use craftbridge::core::{CraftError, Reply, Request};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const TEST_PASSWORD: &str = "hunter2";
pub const OUTPUT_CHANNEL: &str = "stdout";

/// Installs a quiet subscriber that plays well with the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("warn"))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// TestContext provides a server state and one client session driving it
/// through the real dispatcher.
pub struct TestContext {
    pub state: Arc<ServerState>,
    pub bridge: Arc<StreamBridge>,
    pub output_rx: mpsc::Receiver<Bytes>,
    pub session: SessionState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        init_tracing();
        let (bridge, output_rx) = StreamBridge::new(capacity);
        let state = Arc::new(ServerState::new(
            TEST_PASSWORD,
            bridge.clone(),
            OUTPUT_CHANNEL,
        ));
        Self {
            state,
            bridge,
            output_rx,
            session: SessionState::new(1),
        }
    }

    /// Creates another session on the same server.
    pub fn new_session(&self, id: ConnectionId) -> SessionState {
        SessionState::new(id)
    }

    /// Dispatches `verb args...` on the default session.
    pub async fn execute(&mut self, verb: &str, args: &[&str]) -> Result<Reply, CraftError> {
        execute_on(&self.state, &mut self.session, verb, args).await
    }

    /// Authenticates the default session with the right password.
    pub async fn authenticate(&mut self) {
        let reply = self
            .execute("AUTH", &[TEST_PASSWORD])
            .await
            .expect("AUTH should not fail");
        assert_eq!(reply, Reply::ok());
    }
}

/// Dispatches `verb args...` on an arbitrary session.
pub async fn execute_on(
    state: &ServerState,
    session: &mut SessionState,
    verb: &str,
    args: &[&str],
) -> Result<Reply, CraftError> {
    let args = args
        .iter()
        .map(|a| Bytes::copy_from_slice(a.as_bytes()))
        .collect();
    Dispatcher::new(state, session)
        .dispatch(Request::new(verb, args))
        .await
}
