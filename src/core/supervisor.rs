// src/core/supervisor.rs

//! Owns the game server process: starts it, wires its standard streams through
//! the [`StreamBridge`], and stops it gracefully (or not) on shutdown.
//!
//! Lifecycle: `Starting -> Running -> Stopping -> Terminated`, with `Failed`
//! reachable when the process cannot be started or dies with an error. The
//! current state is published on a `watch` channel.

use crate::config::ProcessConfig;
use crate::core::CraftError;
use crate::core::bridge::{OutputSink, StreamBridge, feed_stdin};
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const PUMP_BUFFER_SIZE: usize = 8 * 1024;

/// How long the output pumps get to drain after the process is gone.
const PUMP_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Starting,
    Running,
    Stopping,
    Terminated,
    Failed,
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Terminated | ProcessState::Failed)
    }
}

/// What to run and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// `java -Xms<mem> -Xmx<mem> <jvm_args..> -jar <jar> <server_args..>`,
    /// run from the configured server folder.
    pub fn from_config(config: &ProcessConfig) -> Self {
        let mut args = vec![
            format!("-Xms{}", config.memory),
            format!("-Xmx{}", config.memory),
        ];
        args.extend(config.jvm_args.iter().cloned());
        args.push("-jar".to_string());
        args.push(config.jar.clone());
        args.extend(config.server_args.iter().cloned());

        Self::new(config.java.clone(), args).in_dir(&config.folder)
    }
}

pub struct ProcessSupervisor {
    launch: LaunchSpec,
    bridge: Arc<StreamBridge>,
    stop_command: String,
    shutdown_timeout: Duration,
    mirror_output: bool,
    state_tx: watch::Sender<ProcessState>,
}

impl ProcessSupervisor {
    pub fn new(launch: LaunchSpec, bridge: Arc<StreamBridge>) -> Self {
        let (state_tx, _) = watch::channel(ProcessState::Starting);
        Self {
            launch,
            bridge,
            stop_command: "/stop".to_string(),
            shutdown_timeout: Duration::from_secs(30),
            mirror_output: true,
            state_tx,
        }
    }

    pub fn from_config(config: &ProcessConfig, bridge: Arc<StreamBridge>) -> Self {
        Self::new(LaunchSpec::from_config(config), bridge)
            .with_stop_command(config.stop_command.clone())
            .with_shutdown_timeout(config.shutdown_timeout())
            .with_mirror_output(config.mirror_output)
    }

    pub fn with_stop_command(mut self, command: impl Into<String>) -> Self {
        self.stop_command = command.into();
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn with_mirror_output(mut self, mirror: bool) -> Self {
        self.mirror_output = mirror;
        self
    }

    /// Subscribes to lifecycle state changes.
    pub fn state(&self) -> watch::Receiver<ProcessState> {
        self.state_tx.subscribe()
    }

    /// Runs the process until it exits or `cancel` fires, then cancels `cancel`
    /// so the rest of the server winds down too.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), CraftError> {
        let result = self.supervise(&cancel).await;
        cancel.cancel();
        result
    }

    async fn supervise(&self, cancel: &CancellationToken) -> Result<(), CraftError> {
        let mut child = self.spawn()?;
        self.set_state(ProcessState::Running);
        info!(pid = ?child.id(), program = %self.launch.program, "Process started");

        let feeder = child
            .stdin
            .take()
            .map(|stdin| tokio::spawn(feed_stdin(Arc::clone(&self.bridge), stdin)));

        let mut pumps = JoinSet::new();
        if let Some(stdout) = child.stdout.take() {
            let mirror = self.mirror_output.then(tokio::io::stdout);
            pumps.spawn(pump(stdout, mirror, self.bridge.sink()));
        }
        if let Some(stderr) = child.stderr.take() {
            let mirror = self.mirror_output.then(tokio::io::stderr);
            pumps.spawn(pump(stderr, mirror, self.bridge.sink()));
        }

        let exited = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancel.cancelled() => None,
        };
        let outcome = match exited {
            Some(status) => self.on_exit(status),
            None => self.shutdown(&mut child).await,
        };

        if let Some(feeder) = feeder {
            feeder.abort();
        }
        let drained = tokio::time::timeout(PUMP_DRAIN_TIMEOUT, async {
            while let Some(result) = pumps.join_next().await {
                if let Ok(Err(e)) = result {
                    debug!(error = %e, "Output pump ended with an error");
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!("Output pumps did not finish in time, aborting them");
            pumps.abort_all();
        }

        outcome
    }

    /// Starts the child with piped standard streams. Nothing is attached to
    /// them yet; [`run`](Self::run) wires them to the bridge.
    pub fn spawn(&self) -> Result<Child, CraftError> {
        let mut command = Command::new(&self.launch.program);
        command
            .args(&self.launch.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.launch.working_dir {
            command.current_dir(dir);
        }
        // Own process group: terminal signals must reach only us.
        #[cfg(unix)]
        command.process_group(0);

        command.spawn().map_err(|e| {
            self.set_state(ProcessState::Failed);
            error!(program = %self.launch.program, error = %e, "Failed to start process");
            CraftError::ProcessLaunch(format!("failed to start '{}': {e}", self.launch.program))
        })
    }

    /// Maps an exit that happened on its own to the run's outcome.
    fn on_exit(&self, status: io::Result<ExitStatus>) -> Result<(), CraftError> {
        match status {
            Ok(status) if status.success() => {
                info!(%status, "Process exited");
                self.set_state(ProcessState::Terminated);
                Ok(())
            }
            Ok(status) => {
                error!(%status, "Process exited abnormally");
                self.set_state(ProcessState::Failed);
                Err(CraftError::ProcessRuntime(format!("process exited with {status}")))
            }
            Err(e) => {
                error!(error = %e, "Failed to wait for process");
                self.set_state(ProcessState::Failed);
                Err(CraftError::ProcessRuntime(format!(
                    "failed to wait for process: {e}"
                )))
            }
        }
    }

    /// Asks the process to stop through its console, and kills it if it has
    /// not exited within the shutdown timeout. A child that has already exited
    /// gets no stop command and reports its own exit status.
    pub async fn shutdown(&self, child: &mut Child) -> Result<(), CraftError> {
        self.set_state(ProcessState::Stopping);

        match child.try_wait() {
            Ok(Some(status)) => {
                info!(%status, "Process already exited, no stop command needed");
                return self.on_exit(Ok(status));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Could not poll process status"),
        }

        info!(
            command = %self.stop_command,
            timeout = ?self.shutdown_timeout,
            "Requesting graceful process stop"
        );
        self.bridge.enqueue(self.stop_command.clone());

        match tokio::time::timeout(self.shutdown_timeout, child.wait()).await {
            Ok(Ok(status)) => {
                info!(%status, "Process stopped");
                self.set_state(ProcessState::Terminated);
                Ok(())
            }
            Ok(Err(e)) => {
                error!(error = %e, "Failed to wait for process during shutdown");
                self.set_state(ProcessState::Failed);
                Err(CraftError::ProcessRuntime(format!(
                    "failed to wait for process: {e}"
                )))
            }
            Err(_) => {
                warn!(
                    timeout = ?self.shutdown_timeout,
                    "Process did not stop in time, killing it"
                );
                if let Err(e) = child.kill().await {
                    error!(error = %e, "Failed to kill process");
                }
                self.set_state(ProcessState::Terminated);
                Err(CraftError::GracefulShutdownTimeout(self.shutdown_timeout))
            }
        }
    }

    fn set_state(&self, state: ProcessState) {
        debug!(?state, "Process state changed");
        self.state_tx.send_replace(state);
    }
}

/// Copies one of the child's output streams into the bridge, optionally
/// mirroring it to one of our own streams. Ends at EOF.
async fn pump<R, M>(mut reader: R, mut mirror: Option<M>, mut sink: OutputSink) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    M: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; PUMP_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }

        let mirror_failed = match mirror.as_mut() {
            Some(out) => out.write_all(&buf[..n]).await.is_err() || out.flush().await.is_err(),
            None => false,
        };
        if mirror_failed {
            debug!("Mirror write failed, no longer mirroring this stream");
            mirror = None;
        }

        sink.write_all(&buf[..n]).await?;
    }
}
