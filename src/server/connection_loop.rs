// src/server/connection_loop.rs

//! Contains the main server loop for accepting connections and handling graceful shutdown.

use super::context::ServerContext;
use crate::connection::ConnectionHandler;
use crate::core::CraftError;
use crate::core::state::ConnectionId;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// How long connections get to say goodbye once shutdown starts.
const CLIENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The main server loop. Accepts connections until the context is cancelled,
/// then waits for every connection and background task to finish. Returns the
/// first background task error, if any.
pub async fn run(mut ctx: ServerContext) -> Result<(), CraftError> {
    let mut session_id_counter: ConnectionId = 0;
    let mut client_tasks = JoinSet::new();
    let mut first_error: Option<CraftError> = None;

    loop {
        tokio::select! {
            biased;

            _ = ctx.cancel.cancelled() => {
                info!("Shutdown requested, no longer accepting connections.");
                break;
            }

            Some(res) = ctx.background_tasks.join_next() => {
                match res {
                    Ok(Ok(())) => debug!("A background task finished."),
                    Ok(Err(e)) => {
                        error!("CRITICAL: Background task failed: {}. Shutting down.", e);
                        first_error.get_or_insert(e);
                        ctx.cancel.cancel();
                        break;
                    }
                    Err(e) => {
                        error!("CRITICAL: Background task panicked: {e:?}. Shutting down.");
                        first_error.get_or_insert(CraftError::Internal(format!(
                            "background task panicked: {e}"
                        )));
                        ctx.cancel.cancel();
                        break;
                    }
                }
            },

            res = ctx.listener.accept() => {
                match res {
                    Ok((socket, addr)) => {
                        session_id_counter += 1;
                        let session_id = session_id_counter;
                        if !ctx.state.connect(session_id, addr) {
                            warn!("Connection from {} refused.", addr);
                            continue;
                        }
                        info!("Accepted new connection from: {}", addr);

                        let state = ctx.state.clone();
                        let cancel = ctx.cancel.clone();
                        client_tasks.spawn(async move {
                            let mut handler =
                                ConnectionHandler::new(socket, addr, state, session_id, cancel);
                            if let Err(e) = handler.run().await {
                                warn!("Connection from {} terminated unexpectedly: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res
                    && e.is_panic()
                {
                    error!("A client handler panicked: {e:?}");
                }
            },
        }
    }

    drop(ctx.listener);

    info!("Waiting for client connections to close...");
    if tokio::time::timeout(CLIENT_DRAIN_TIMEOUT, async {
        while client_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("Timed out waiting for client connections, aborting the rest.");
        client_tasks.shutdown().await;
    }
    info!("All client connections closed.");

    // The supervisor bounds its own shutdown, so this wait is bounded too.
    info!("Waiting for background tasks to finish...");
    while let Some(res) = ctx.background_tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Background task failed during shutdown: {}", e);
                first_error.get_or_insert(e);
            }
            Err(e) => {
                error!("Background task panicked during shutdown: {e:?}");
                first_error.get_or_insert(CraftError::Internal(format!(
                    "background task panicked: {e}"
                )));
            }
        }
    }

    let bridge_stats = ctx.state.bridge.stats();
    info!(
        connections = ctx.state.stats.get_total_connections(),
        commands = ctx.state.stats.get_total_commands(),
        captured_chunks = bridge_stats.captured(),
        dropped_chunks = bridge_stats.dropped(),
        "Server shutdown complete."
    );

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
