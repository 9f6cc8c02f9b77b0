// src/core/pubsub/output_forwarder.rs

//! A background task that publishes captured process output.

use crate::core::CraftError;
use crate::core::state::ServerState;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace};

/// Moves chunks from the bridge's output channel onto the pub/sub output
/// channel, one publish per chunk, in capture order.
pub struct OutputForwarderTask {
    state: Arc<ServerState>,
    output_rx: mpsc::Receiver<Bytes>,
}

impl OutputForwarderTask {
    pub fn new(state: Arc<ServerState>, output_rx: mpsc::Receiver<Bytes>) -> Self {
        Self { state, output_rx }
    }

    /// Runs until `cancel` fires or the bridge goes away. Chunks already
    /// buffered when cancellation arrives are still published.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), CraftError> {
        info!("Output forwarder task started.");
        loop {
            tokio::select! {
                chunk = self.output_rx.recv() => match chunk {
                    Some(chunk) => self.forward(chunk),
                    None => {
                        info!("Output channel closed, forwarder exiting.");
                        return Ok(());
                    }
                },
                _ = cancel.cancelled() => {
                    while let Ok(chunk) = self.output_rx.try_recv() {
                        self.forward(chunk);
                    }
                    info!("Output forwarder task shutting down.");
                    return Ok(());
                }
            }
        }
    }

    fn forward(&self, chunk: Bytes) {
        let len = chunk.len();
        let receivers = self.state.publish_output(chunk);
        trace!(bytes = len, receivers, "Published process output");
    }
}
