// src/server/signals.rs

//! Turns operator signals into cancellation of the whole server.

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Registers SIGINT, SIGTERM and SIGQUIT handlers and spawns a task that
/// cancels `cancel` when the first of them arrives.
pub fn spawn_watcher(cancel: CancellationToken) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to register SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
    let mut sigquit = signal(SignalKind::quit()).context("Failed to register SIGQUIT handler")?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => info!("SIGINT received, initiating graceful shutdown."),
            _ = sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown."),
            _ = sigquit.recv() => info!("SIGQUIT received, initiating graceful shutdown."),
            _ = cancel.cancelled() => return,
        }
        cancel.cancel();
    });
    Ok(())
}
