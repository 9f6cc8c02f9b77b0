// src/server/initialization.rs

//! Builds everything the server needs before it starts accepting connections.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::state::ServerState;
use crate::core::supervisor::ProcessSupervisor;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Initializes all server components before starting the main loop.
pub async fn setup(config: Config, cancel: CancellationToken) -> Result<ServerContext> {
    log_startup_info(&config);

    let server_init = ServerState::initialize(&config);
    let state = server_init.state;

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind listener on {addr}"))?;
    info!("craftbridge listening on {}", listener.local_addr()?);

    let supervisor = ProcessSupervisor::from_config(&config.process, state.bridge.clone());

    Ok(ServerContext {
        config,
        state,
        listener,
        cancel,
        background_tasks: JoinSet::new(),
        supervisor: Some(supervisor),
        output_rx: Some(server_init.output_rx),
    })
}

/// Logs key configuration parameters at startup.
fn log_startup_info(config: &Config) {
    info!(
        "Server folder '{}', jar '{}', memory {}.",
        config.process.folder, config.process.jar, config.process.memory
    );
    info!(
        "Process output is published on channel '{}' (buffer {} chunks).",
        config.output.channel, config.output.capacity
    );
}
