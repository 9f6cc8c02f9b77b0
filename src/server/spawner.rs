// src/server/spawner.rs

//! Spawns all of the server's long-running background tasks.

use super::context::ServerContext;
use crate::core::pubsub::channel_purger::ChannelPurgerTask;
use crate::core::pubsub::output_forwarder::OutputForwarderTask;
use anyhow::{Result, anyhow};
use tracing::info;

/// Spawns the process supervisor, the output forwarder and the channel purger
/// into the context's JoinSet.
pub fn spawn_all(ctx: &mut ServerContext) -> Result<()> {
    let supervisor = ctx
        .supervisor
        .take()
        .ok_or_else(|| anyhow!("process supervisor was already spawned"))?;
    let output_rx = ctx
        .output_rx
        .take()
        .ok_or_else(|| anyhow!("output forwarder was already spawned"))?;

    // --- Process Supervisor ---
    ctx.background_tasks.spawn(supervisor.run(ctx.cancel.clone()));

    // --- Output Forwarder ---
    let forwarder = OutputForwarderTask::new(ctx.state.clone(), output_rx);
    ctx.background_tasks.spawn(forwarder.run(ctx.cancel.clone()));

    // --- Pub/Sub Channel Purger ---
    let purger = ChannelPurgerTask::new(ctx.state.clone(), ctx.config.output.purge_interval());
    let cancel = ctx.cancel.clone();
    ctx.background_tasks.spawn(async move {
        purger.run(cancel).await;
        Ok(())
    });

    info!("All background tasks have been spawned.");
    Ok(())
}
