// tests/integration/server_test.rs

//! End-to-end tests over TCP with a `/bin/sh` child standing in for the game
//! server.

use super::test_helpers::{TEST_PASSWORD, init_tracing};
use bytes::Bytes;
use craftbridge::config::Config;
use craftbridge::core::CraftError;
use craftbridge::core::protocol::{RespFrame, RespFrameCodec};
use craftbridge::core::supervisor::{LaunchSpec, ProcessSupervisor};
use craftbridge::server;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

/// Echoes every console line back on stdout until it is told to stop.
const ECHO_CONSOLE: &str = r#"while read line; do case "$line" in /stop*) echo "Stopping server"; exit 0;; esac; echo "[Server] $line"; done"#;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<anyhow::Result<()>>,
    _folder: TempDir,
}

impl TestServer {
    async fn start(script: &str) -> Self {
        init_tracing();
        let folder = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.password = TEST_PASSWORD.to_string();
        config.process.folder = folder.path().to_string_lossy().into_owned();
        config.validate().unwrap();

        let cancel = CancellationToken::new();
        let mut ctx = server::setup(config, cancel.clone()).await.unwrap();
        let launch = LaunchSpec::new("sh", vec!["-c".to_string(), script.to_string()])
            .in_dir(folder.path());
        ctx.supervisor = Some(
            ProcessSupervisor::new(launch, ctx.state.bridge.clone())
                .with_mirror_output(false)
                .with_shutdown_timeout(Duration::from_secs(5)),
        );
        let addr = ctx.local_addr().unwrap();
        let handle = tokio::spawn(server::serve(ctx));

        Self {
            addr,
            cancel,
            handle,
            _folder: folder,
        }
    }

    async fn client(&self) -> Framed<TcpStream, RespFrameCodec> {
        let stream = TcpStream::connect(self.addr).await.unwrap();
        Framed::new(stream, RespFrameCodec)
    }

    async fn shutdown(self) -> anyhow::Result<()> {
        self.cancel.cancel();
        tokio::time::timeout(Duration::from_secs(15), self.handle)
            .await
            .expect("server did not shut down in time")
            .unwrap()
    }
}

fn command(parts: &[&str]) -> RespFrame {
    RespFrame::Array(
        parts
            .iter()
            .map(|p| RespFrame::BulkString(Bytes::copy_from_slice(p.as_bytes())))
            .collect(),
    )
}

async fn request(client: &mut Framed<TcpStream, RespFrameCodec>, parts: &[&str]) -> RespFrame {
    client.send(command(parts)).await.unwrap();
    next_frame(client).await
}

async fn next_frame(client: &mut Framed<TcpStream, RespFrameCodec>) -> RespFrame {
    tokio::time::timeout(READ_TIMEOUT, client.next())
        .await
        .expect("timed out waiting for a reply")
        .expect("connection closed")
        .unwrap()
}

/// Reads frames until a pushed message carries `needle`.
async fn wait_for_message(client: &mut Framed<TcpStream, RespFrameCodec>, needle: &str) {
    loop {
        if let RespFrame::Array(items) = next_frame(client).await
            && items.len() == 3
            && items[0] == RespFrame::BulkString(Bytes::from_static(b"message"))
            && let RespFrame::BulkString(payload) = &items[2]
            && String::from_utf8_lossy(payload).contains(needle)
        {
            return;
        }
    }
}

#[tokio::test]
async fn test_auth_flow_over_tcp() {
    let server = TestServer::start(ECHO_CONSOLE).await;
    let mut client = server.client().await;

    assert_eq!(
        request(&mut client, &["PING"]).await,
        RespFrame::SimpleString("PONG".into())
    );
    assert_eq!(
        request(&mut client, &["SAY", "hi"]).await,
        RespFrame::Error("NOAUTH Authentication required".into())
    );
    assert_eq!(request(&mut client, &["AUTH", "nope"]).await, RespFrame::Null);
    assert_eq!(
        request(&mut client, &["AUTH", TEST_PASSWORD]).await,
        RespFrame::SimpleString("OK".into())
    );
    assert_eq!(request(&mut client, &["SAY", "hi"]).await, RespFrame::Null);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_command_keeps_connection_open() {
    let server = TestServer::start(ECHO_CONSOLE).await;
    let mut client = server.client().await;

    assert_eq!(
        request(&mut client, &["FLUSHALL"]).await,
        RespFrame::Error("ERR unknown command 'flushall'".into())
    );
    assert_eq!(
        request(&mut client, &["PING", "still here"]).await,
        RespFrame::BulkString(Bytes::from_static(b"still here"))
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_inline_commands() {
    let server = TestServer::start(ECHO_CONSOLE).await;
    let mut client = server.client().await;

    client.get_mut().write_all(b"PING\r\n").await.unwrap();
    assert_eq!(
        next_frame(&mut client).await,
        RespFrame::SimpleString("PONG".into())
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_console_output_is_pushed_to_subscribers() {
    let server = TestServer::start(ECHO_CONSOLE).await;
    let mut watcher = server.client().await;
    let mut operator = server.client().await;

    assert_eq!(
        request(&mut watcher, &["SUBSCRIBE"]).await,
        RespFrame::Array(vec![
            RespFrame::BulkString(Bytes::from_static(b"subscribe")),
            RespFrame::BulkString(Bytes::from_static(b"stdout")),
            RespFrame::Integer(1),
        ])
    );

    request(&mut operator, &["AUTH", TEST_PASSWORD]).await;
    assert_eq!(
        request(&mut operator, &["SAY", "hello", "world"]).await,
        RespFrame::Null
    );

    wait_for_message(&mut watcher, "[Server] /say hello world").await;

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_notifies_clients_and_stops_process() {
    let server = TestServer::start(ECHO_CONSOLE).await;
    let mut client = server.client().await;
    request(&mut client, &["SUBSCRIBE"]).await;
    assert_eq!(
        request(&mut client, &["PING"]).await,
        RespFrame::SimpleString("PONG".into())
    );

    let cancel = server.cancel.clone();
    let shutdown = tokio::spawn(server.shutdown());

    let mut saw_shutdown = false;
    while let Ok(Some(Ok(frame))) = tokio::time::timeout(READ_TIMEOUT, client.next()).await {
        if frame == RespFrame::Error("SHUTDOWN server is shutting down".into()) {
            saw_shutdown = true;
        }
    }
    assert!(saw_shutdown);
    assert!(cancel.is_cancelled());

    shutdown.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_process_failure_ends_the_server() {
    let server = TestServer::start("exit 2").await;

    let result = tokio::time::timeout(Duration::from_secs(15), server.handle)
        .await
        .expect("server did not stop after the process died")
        .unwrap();

    let err = result.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<CraftError>(),
            Some(CraftError::ProcessRuntime(_))
        ),
        "got {err:?}"
    );
    assert!(server.cancel.is_cancelled());
}
