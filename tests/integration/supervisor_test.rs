// tests/integration/supervisor_test.rs

//! Process supervisor lifecycle against small `/bin/sh` children.

use super::test_helpers::init_tracing;
use bytes::Bytes;
use craftbridge::config::ProcessConfig;
use craftbridge::core::CraftError;
use craftbridge::core::bridge::StreamBridge;
use craftbridge::core::supervisor::{LaunchSpec, ProcessState, ProcessSupervisor};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn sh(script: &str) -> LaunchSpec {
    LaunchSpec::new("sh", vec!["-c".to_string(), script.to_string()])
}

fn supervisor(launch: LaunchSpec) -> (ProcessSupervisor, Arc<StreamBridge>, mpsc::Receiver<Bytes>) {
    init_tracing();
    let (bridge, output_rx) = StreamBridge::new(256);
    let supervisor = ProcessSupervisor::new(launch, bridge.clone()).with_mirror_output(false);
    (supervisor, bridge, output_rx)
}

/// Everything captured so far, as text.
fn collected_output(output_rx: &mut mpsc::Receiver<Bytes>) -> String {
    let mut out = Vec::new();
    while let Ok(chunk) = output_rx.try_recv() {
        out.extend_from_slice(&chunk);
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[tokio::test]
async fn test_clean_exit_is_success_and_cancels() {
    let (supervisor, _bridge, _rx) = supervisor(sh("exit 0"));
    let state = supervisor.state();
    let cancel = CancellationToken::new();

    supervisor.run(cancel.clone()).await.unwrap();

    assert_eq!(*state.borrow(), ProcessState::Terminated);
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn test_abnormal_exit_is_runtime_error() {
    let (supervisor, _bridge, _rx) = supervisor(sh("exit 3"));
    let state = supervisor.state();

    let err = supervisor.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, CraftError::ProcessRuntime(_)), "got {err:?}");
    assert!(err.is_fatal());
    assert_eq!(*state.borrow(), ProcessState::Failed);
}

#[tokio::test]
async fn test_launch_failure() {
    let launch = LaunchSpec::new("/nonexistent/craftbridge-test-binary", Vec::new());
    let (supervisor, _bridge, _rx) = supervisor(launch);
    let state = supervisor.state();
    let cancel = CancellationToken::new();

    let err = supervisor.run(cancel.clone()).await.unwrap_err();

    assert!(matches!(err, CraftError::ProcessLaunch(_)), "got {err:?}");
    assert_eq!(*state.borrow(), ProcessState::Failed);
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn test_stdout_and_stderr_are_captured() {
    let (supervisor, _bridge, mut output_rx) = supervisor(sh("echo hello; echo oops 1>&2"));

    supervisor.run(CancellationToken::new()).await.unwrap();

    let output = collected_output(&mut output_rx);
    assert!(output.contains("hello"), "output was {output:?}");
    assert!(output.contains("oops"), "output was {output:?}");
}

#[tokio::test]
async fn test_queued_commands_reach_stdin() {
    let (supervisor, bridge, mut output_rx) = supervisor(sh("read line; echo \"got $line\""));
    bridge.enqueue("/say hi");

    supervisor.run(CancellationToken::new()).await.unwrap();

    let output = collected_output(&mut output_rx);
    assert!(output.contains("got /say hi"), "output was {output:?}");
    assert_eq!(bridge.pending(), 0);
}

#[tokio::test]
async fn test_working_directory_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let expected = dir.path().canonicalize().unwrap();
    let (supervisor, _bridge, mut output_rx) = supervisor(sh("pwd -P").in_dir(dir.path()));

    supervisor.run(CancellationToken::new()).await.unwrap();

    let output = collected_output(&mut output_rx);
    assert_eq!(output.trim(), expected.to_string_lossy());
}

#[tokio::test]
async fn test_graceful_stop_on_cancel() {
    let script = r#"while read line; do case "$line" in /stop*) echo "stop received"; exit 0;; esac; done"#;
    let (supervisor, _bridge, mut output_rx) = supervisor(sh(script));
    let supervisor = supervisor.with_shutdown_timeout(Duration::from_secs(10));
    let mut state = supervisor.state();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(supervisor.run(cancel.clone()));
    state
        .wait_for(|s| *s == ProcessState::Running)
        .await
        .unwrap();
    cancel.cancel();

    let result = task.await.unwrap();
    assert!(result.is_ok(), "got {result:?}");
    assert_eq!(*state.borrow(), ProcessState::Terminated);

    let output = collected_output(&mut output_rx);
    assert_eq!(output.matches("stop received").count(), 1, "output was {output:?}");
}

#[tokio::test]
async fn test_custom_stop_command() {
    let script = r#"while read line; do case "$line" in shutdown*) exit 0;; esac; done"#;
    let (supervisor, _bridge, _rx) = supervisor(sh(script));
    let supervisor = supervisor
        .with_stop_command("shutdown now")
        .with_shutdown_timeout(Duration::from_secs(10));
    let mut state = supervisor.state();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(supervisor.run(cancel.clone()));
    state
        .wait_for(|s| *s == ProcessState::Running)
        .await
        .unwrap();
    cancel.cancel();

    assert!(task.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_stubborn_process_is_killed_after_timeout() {
    let timeout = Duration::from_millis(300);
    let (supervisor, _bridge, _rx) = supervisor(sh("exec sleep 30"));
    let supervisor = supervisor.with_shutdown_timeout(timeout);
    let mut state = supervisor.state();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(supervisor.run(cancel.clone()));
    state
        .wait_for(|s| *s == ProcessState::Running)
        .await
        .unwrap();

    let started = Instant::now();
    cancel.cancel();
    let err = task.await.unwrap().unwrap_err();

    assert_eq!(err, CraftError::GracefulShutdownTimeout(timeout));
    assert_eq!(*state.borrow(), ProcessState::Terminated);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_shutdown_of_exited_child_sends_no_stop_command() {
    let (supervisor, bridge, _rx) = supervisor(sh("exit 0"));
    let state = supervisor.state();

    let mut child = supervisor.spawn().unwrap();
    assert!(child.wait().await.unwrap().success());

    supervisor.shutdown(&mut child).await.unwrap();

    assert_eq!(bridge.pending(), 0, "no stop command may be queued");
    assert!(bridge.drain().is_empty());
    assert_eq!(*state.borrow(), ProcessState::Terminated);
}

#[tokio::test]
async fn test_shutdown_of_failed_child_reports_its_exit() {
    let (supervisor, bridge, _rx) = supervisor(sh("exit 4"));
    let state = supervisor.state();

    let mut child = supervisor.spawn().unwrap();
    child.wait().await.unwrap();

    let err = supervisor.shutdown(&mut child).await.unwrap_err();

    assert!(matches!(err, CraftError::ProcessRuntime(_)), "got {err:?}");
    assert_eq!(bridge.pending(), 0);
    assert_eq!(*state.borrow(), ProcessState::Failed);
}

#[tokio::test]
async fn test_shutdown_of_live_child_queues_stop_command() {
    let (supervisor, bridge, _rx) = supervisor(sh("exec sleep 30"));
    let supervisor = supervisor.with_shutdown_timeout(Duration::from_millis(200));

    let mut child = supervisor.spawn().unwrap();
    let err = supervisor.shutdown(&mut child).await.unwrap_err();

    // Nothing feeds stdin here, so the queued stop command stays visible.
    assert_eq!(err, CraftError::GracefulShutdownTimeout(Duration::from_millis(200)));
    assert_eq!(bridge.drain(), Bytes::from_static(b"/stop\r\n"));
}

#[test]
fn test_launch_spec_from_config() {
    let config = ProcessConfig {
        folder: "/srv/minecraft".to_string(),
        memory: "4G".to_string(),
        jvm_args: vec!["-XX:+UseG1GC".to_string()],
        ..ProcessConfig::default()
    };

    let launch = LaunchSpec::from_config(&config);

    assert_eq!(launch.program, "java");
    assert_eq!(
        launch.args,
        vec![
            "-Xms4G",
            "-Xmx4G",
            "-XX:+UseG1GC",
            "-jar",
            "minecraft_server.1.16.5.jar",
            "-nogui",
        ]
    );
    assert_eq!(
        launch.working_dir.as_deref(),
        Some(std::path::Path::new("/srv/minecraft"))
    );
}

#[test]
fn test_terminal_states() {
    assert!(ProcessState::Terminated.is_terminal());
    assert!(ProcessState::Failed.is_terminal());
    assert!(!ProcessState::Running.is_terminal());
    assert!(!ProcessState::Stopping.is_terminal());
}
