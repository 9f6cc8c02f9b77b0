// src/server/context.rs

use crate::config::Config;
use crate::core::CraftError;
use crate::core::state::ServerState;
use crate::core::supervisor::ProcessSupervisor;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Holds all the initialized state required to run the server's main loop.
pub struct ServerContext {
    pub config: Config,
    pub state: Arc<ServerState>,
    pub listener: TcpListener,
    /// Fired by signals, by the supervisor when the process ends, or by a
    /// failing background task.
    pub cancel: CancellationToken,
    pub background_tasks: JoinSet<Result<(), CraftError>>,
    /// Taken by the spawner.
    pub supervisor: Option<ProcessSupervisor>,
    /// Taken by the spawner.
    pub output_rx: Option<mpsc::Receiver<Bytes>>,
}

impl ServerContext {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
