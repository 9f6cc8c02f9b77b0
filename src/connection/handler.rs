// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a client connection.

use super::guard::ConnectionGuard;
use super::session::SessionState;
use crate::core::handler::Dispatcher;
use crate::core::protocol::{RespFrame, RespFrameCodec};
use crate::core::pubsub::receive_message;
use crate::core::state::{ConnectionId, ServerState};
use crate::core::{CraftError, Request};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The error line every connection receives when the server shuts down.
pub const SHUTDOWN_MESSAGE: &str = "SHUTDOWN server is shutting down";

/// Whatever woke the connection loop up.
enum Event {
    Shutdown,
    Message(usize, Result<RespFrame, RecvError>),
    Frame(Option<Result<RespFrame, CraftError>>),
}

/// Manages the full lifecycle of a client connection.
pub struct ConnectionHandler<S> {
    framed: Framed<S, RespFrameCodec>,
    addr: SocketAddr,
    state: Arc<ServerState>,
    session: SessionState,
    cancel: CancellationToken,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        socket: S,
        addr: SocketAddr,
        state: Arc<ServerState>,
        session_id: ConnectionId,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            framed: Framed::new(socket, RespFrameCodec),
            addr,
            state,
            session: SessionState::new(session_id),
            cancel,
        }
    }

    /// The main event loop for the connection. Returns when the peer goes
    /// away, the stream fails, or the server shuts down.
    pub async fn run(&mut self) -> Result<(), CraftError> {
        let _guard = ConnectionGuard::new(self.state.clone(), self.session.id, self.addr);

        loop {
            let event = tokio::select! {
                // Prioritize shutdown over pending traffic.
                biased;
                _ = self.cancel.cancelled() => Event::Shutdown,
                (index, message) = receive_message(&mut self.session.subscriptions) => {
                    Event::Message(index, message)
                }
                frame = self.framed.next() => Event::Frame(frame),
            };

            match event {
                Event::Shutdown => {
                    info!("Connection handler for {} received shutdown signal.", self.addr);
                    let _ = self
                        .framed
                        .send(RespFrame::Error(SHUTDOWN_MESSAGE.to_string()))
                        .await;
                    break;
                }
                Event::Message(_, Ok(frame)) => {
                    self.framed.send(frame).await?;
                }
                Event::Message(index, Err(RecvError::Lagged(skipped))) => {
                    warn!(
                        session_id = self.session.id,
                        channel = ?self.session.subscriptions[index].channel,
                        skipped,
                        "Subscriber lagged behind, messages were skipped"
                    );
                }
                Event::Message(index, Err(RecvError::Closed)) => {
                    let sub = self.session.subscriptions.swap_remove(index);
                    debug!(session_id = self.session.id, channel = ?sub.channel, "Channel closed");
                }
                Event::Frame(Some(Ok(frame))) => {
                    debug!("Session {}: Received frame: {:?}", self.session.id, frame);
                    self.process_frame(frame).await?;
                }
                Event::Frame(Some(Err(e))) => {
                    if is_normal_disconnect(&e) {
                        debug!("Connection from {} closed by peer: {}", self.addr, e);
                    } else {
                        warn!("Connection error for {}: {}", self.addr, e);
                        let _ = self.framed.send(RespFrame::Error(e.to_string())).await;
                    }
                    break;
                }
                Event::Frame(None) => {
                    debug!("Connection from {} closed by peer.", self.addr);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Dispatches one decoded frame and writes the reply. Request-level errors
    /// become error replies; only write failures end the connection.
    async fn process_frame(&mut self, frame: RespFrame) -> Result<(), CraftError> {
        let result = match Request::try_from(frame) {
            Ok(request) => Dispatcher::new(&self.state, &mut self.session)
                .dispatch(request)
                .await
                .and_then(|reply| reply.into_frame()),
            Err(e) => Err(e),
        };

        let response = result.unwrap_or_else(|e| {
            debug!("Session {}: Sending error response: {}", self.session.id, e);
            RespFrame::Error(e.to_string())
        });
        self.framed.send(response).await
    }
}

/// Helper function to check for non-critical disconnection errors.
fn is_normal_disconnect(e: &CraftError) -> bool {
    matches!(e, CraftError::Io(arc_err) if matches!(
        arc_err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    ))
}
