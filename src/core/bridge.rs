// src/core/bridge.rs

//! The stream bridge between the supervised process and the rest of the server.
//!
//! Commands flow in through [`StreamBridge::enqueue`] and leave as one batch per
//! [`StreamBridge::drain`], which is what feeds the child's stdin. The child's
//! stdout/stderr flow in through [`StreamBridge::capture`] and are handed to the
//! pub/sub forwarder over a bounded channel.
//!
//! The two directions never share a lock. Output capture is deliberately
//! lossy: when the channel is full the newest chunk is dropped so a slow
//! subscriber can never stall the child's output pipe.

use bytes::Bytes;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Notify;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

/// Terminates every command written to the child's stdin.
pub const LINE_DELIMITER: &str = "\r\n";

/// Counters describing what happened to captured output.
#[derive(Debug, Default)]
pub struct BridgeStats {
    captured_chunks: AtomicU64,
    dropped_chunks: AtomicU64,
}

impl BridgeStats {
    pub fn captured(&self) -> u64 {
        self.captured_chunks.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped_chunks.load(Ordering::Relaxed)
    }
}

/// Duplex bridge between the command dispatch layer and the child's standard I/O.
#[derive(Debug)]
pub struct StreamBridge {
    /// Pending outbound commands, in enqueue order.
    commands: Mutex<Vec<String>>,
    /// Signalled on every enqueue so the stdin feeder does not have to poll.
    ready: Notify,
    output_tx: mpsc::Sender<Bytes>,
    stats: BridgeStats,
}

impl StreamBridge {
    /// Creates a bridge whose output channel holds at most `capacity` chunks.
    /// Returns the receiving end of that channel alongside the bridge.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<Bytes>) {
        let (output_tx, output_rx) = mpsc::channel(capacity);
        let bridge = Arc::new(Self {
            commands: Mutex::new(Vec::new()),
            ready: Notify::new(),
            output_tx,
            stats: BridgeStats::default(),
        });
        (bridge, output_rx)
    }

    /// Appends a command to the queue. Never blocks on I/O and never fails.
    pub fn enqueue(&self, command: impl Into<String>) {
        let command = command.into();
        debug!(command = %command, "Queueing console command");
        self.commands.lock().push(command);
        self.ready.notify_one();
    }

    /// Takes every queued command, joined and terminated by [`LINE_DELIMITER`].
    ///
    /// Returns empty bytes right away if nothing is queued.
    pub fn drain(&self) -> Bytes {
        let commands = std::mem::take(&mut *self.commands.lock());
        if commands.is_empty() {
            return Bytes::new();
        }
        let mut data = commands.join(LINE_DELIMITER);
        data.push_str(LINE_DELIMITER);
        Bytes::from(data)
    }

    /// Number of commands waiting to be drained.
    pub fn pending(&self) -> usize {
        self.commands.lock().len()
    }

    /// Resolves once at least one `enqueue` happened since the last wake-up.
    ///
    /// An enqueue that happens while nobody is waiting is remembered, so a
    /// `drain` followed by `wait_for_commands` cannot miss a command.
    pub async fn wait_for_commands(&self) {
        self.ready.notified().await;
    }

    /// Hands a chunk of process output to the fan-out without ever blocking.
    ///
    /// The chunk is copied, so callers may reuse their buffer. Returns
    /// `chunk.len()` whether or not the chunk was actually delivered.
    pub fn capture(&self, chunk: &[u8]) -> usize {
        if chunk.is_empty() {
            return 0;
        }
        let data = Bytes::copy_from_slice(chunk);
        match self.output_tx.try_send(data) {
            Ok(()) => {
                self.stats.captured_chunks.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(dropped)) | Err(TrySendError::Closed(dropped)) => {
                self.stats.dropped_chunks.fetch_add(1, Ordering::Relaxed);
                trace!(bytes = dropped.len(), "Output channel unavailable, dropping chunk");
            }
        }
        chunk.len()
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Returns an `AsyncWrite` handle that captures everything written to it.
    pub fn sink(self: &Arc<Self>) -> OutputSink {
        OutputSink {
            bridge: Arc::clone(self),
        }
    }
}

/// The write half of the bridge, used as the destination for the child's
/// stdout and stderr. Writes always complete immediately and in full.
#[derive(Debug, Clone)]
pub struct OutputSink {
    bridge: Arc<StreamBridge>,
}

impl AsyncWrite for OutputSink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        Poll::Ready(Ok(self.bridge.capture(buf)))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }
}

/// Feeds queued commands into `stdin` until writing fails.
///
/// This is the read half of the bridge: it sleeps until something is
/// enqueued, drains the whole queue and writes it as one batch.
pub async fn feed_stdin<W>(bridge: Arc<StreamBridge>, mut stdin: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        bridge.wait_for_commands().await;
        let batch = bridge.drain();
        if batch.is_empty() {
            continue;
        }
        stdin.write_all(&batch).await?;
        stdin.flush().await?;
    }
}
