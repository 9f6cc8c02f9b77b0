// tests/integration/pubsub_test.rs

//! SUBSCRIBE through the dispatcher and delivery of published output.

use super::test_helpers::{OUTPUT_CHANNEL, TestContext, execute_on};
use bytes::Bytes;
use craftbridge::core::protocol::RespFrame;
use craftbridge::core::pubsub::receive_message;
use craftbridge::core::{CraftError, Reply};
use std::time::Duration;

fn message(channel: &str, payload: &'static [u8]) -> RespFrame {
    RespFrame::Array(vec![
        RespFrame::BulkString(Bytes::from_static(b"message")),
        RespFrame::BulkString(Bytes::copy_from_slice(channel.as_bytes())),
        RespFrame::BulkString(Bytes::from_static(payload)),
    ])
}

#[tokio::test]
async fn test_subscribe_defaults_to_output_channel() {
    let mut ctx = TestContext::new();
    let reply = ctx.execute("SUBSCRIBE", &[]).await.unwrap();
    assert_eq!(
        reply,
        Reply::Array(vec![
            Reply::bulk("subscribe"),
            Reply::bulk(OUTPUT_CHANNEL),
            Reply::Integer(1),
        ])
    );
    assert!(ctx.state.pubsub.is_subscribed(1, &Bytes::from_static(b"stdout")));
}

#[tokio::test]
async fn test_subscribe_is_idempotent() {
    let mut ctx = TestContext::new();
    ctx.execute("SUBSCRIBE", &["stdout"]).await.unwrap();
    let reply = ctx.execute("SUBSCRIBE", &["stdout"]).await.unwrap();
    assert_eq!(
        reply,
        Reply::Array(vec![
            Reply::bulk("subscribe"),
            Reply::bulk("stdout"),
            Reply::Integer(1),
        ])
    );
    assert_eq!(ctx.session.subscriptions.len(), 1);
    assert_eq!(
        ctx.state.pubsub.subscriber_count(&Bytes::from_static(b"stdout")),
        1
    );
}

#[tokio::test]
async fn test_subscribe_rejects_multiple_channels() {
    let mut ctx = TestContext::new();
    let err = ctx.execute("SUBSCRIBE", &["a", "b"]).await.unwrap_err();
    assert_eq!(err, CraftError::WrongArgumentCount("subscribe".into()));
}

#[tokio::test]
async fn test_published_output_reaches_subscriber_in_order() {
    let mut ctx = TestContext::new();
    ctx.execute("SUBSCRIBE", &[]).await.unwrap();

    assert_eq!(ctx.state.publish_output(Bytes::from_static(b"line one\n")), 1);
    assert_eq!(ctx.state.publish_output(Bytes::from_static(b"line two\n")), 1);

    let (index, first) = receive_message(&mut ctx.session.subscriptions).await;
    assert_eq!(index, 0);
    assert_eq!(first.unwrap(), message("stdout", b"line one\n"));
    let (_, second) = receive_message(&mut ctx.session.subscriptions).await;
    assert_eq!(second.unwrap(), message("stdout", b"line two\n"));
}

#[tokio::test]
async fn test_unsubscribed_connection_receives_nothing() {
    let mut ctx = TestContext::new();
    let mut listener = ctx.new_session(2);
    execute_on(&ctx.state, &mut listener, "SUBSCRIBE", &[])
        .await
        .unwrap();

    ctx.state.publish_output(Bytes::from_static(b"hello"));

    let (_, received) = receive_message(&mut listener.subscriptions).await;
    assert_eq!(received.unwrap(), message("stdout", b"hello"));

    let idle = tokio::time::timeout(
        Duration::from_millis(50),
        receive_message(&mut ctx.session.subscriptions),
    )
    .await;
    assert!(idle.is_err(), "a session without subscriptions must stay idle");
}

#[tokio::test]
async fn test_disconnect_removes_subscriptions() {
    let mut ctx = TestContext::new();
    ctx.execute("SUBSCRIBE", &[]).await.unwrap();
    ctx.execute("SUBSCRIBE", &["chat"]).await.unwrap();

    ctx.state.disconnect(ctx.session.id);
    let stdout = Bytes::from_static(b"stdout");
    assert!(!ctx.state.pubsub.is_subscribed(ctx.session.id, &stdout));
    assert_eq!(ctx.state.pubsub.subscriber_count(&stdout), 0);

    // Once the session's receivers are gone the senders can be purged.
    ctx.session.subscriptions.clear();
    assert_eq!(ctx.state.pubsub.purge_empty_channels(), 2);
    assert_eq!(ctx.state.publish_output(Bytes::from_static(b"late")), 0);
}

#[tokio::test]
async fn test_subscribed_connection_can_still_run_commands() {
    let mut ctx = TestContext::new();
    ctx.execute("SUBSCRIBE", &[]).await.unwrap();
    ctx.authenticate().await;
    assert_eq!(ctx.execute("SAY", &["hi"]).await.unwrap(), Reply::Null);
    assert_eq!(ctx.bridge.drain(), Bytes::from_static(b"/say hi\r\n"));
}
