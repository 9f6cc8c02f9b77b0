// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

mod connection_loop;
mod context;
mod initialization;
mod signals;
mod spawner;

pub use context::ServerContext;
pub use initialization::setup;

/// The main server startup function, orchestrating all setup phases. Returns
/// once the server has shut down, with the first fatal error if there was one.
pub async fn run(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();

    // 1. Turn operator signals into cancellation.
    signals::spawn_watcher(cancel.clone())?;

    // 2. Initialize server state and the listener.
    let server_context = initialization::setup(config, cancel).await?;

    // 3. Spawn the background tasks and accept connections until shutdown.
    serve(server_context).await
}

/// Spawns the background tasks for an initialized context and runs the accept
/// loop until the context's cancellation token fires.
pub async fn serve(mut server_context: ServerContext) -> Result<()> {
    spawner::spawn_all(&mut server_context)?;
    connection_loop::run(server_context).await?;
    Ok(())
}
