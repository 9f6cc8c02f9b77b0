// src/core/pubsub/channel_purger.rs

//! A background task to periodically clean up empty Pub/Sub channels.

use crate::core::state::ServerState;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct ChannelPurgerTask {
    state: Arc<ServerState>,
    interval: Duration,
}

impl ChannelPurgerTask {
    pub fn new(state: Arc<ServerState>, interval: Duration) -> Self {
        Self { state, interval }
    }

    /// Periodically drops channel senders nobody listens to any more.
    pub async fn run(self, cancel: CancellationToken) {
        info!("Pub/Sub channel purger task started.");
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.state.pubsub.purge_empty_channels();
                }
                _ = cancel.cancelled() => {
                    info!("Pub/Sub channel purger task shutting down.");
                    return;
                }
            }
        }
    }
}
