// src/core/pubsub/handler.rs

//! Receiving side of a connection's subscriptions.

use crate::core::protocol::RespFrame;
use bytes::Bytes;
use futures::future::FutureExt;
use tokio::sync::broadcast;

/// One channel subscription held by a connection.
#[derive(Debug)]
pub struct Subscription {
    pub channel: Bytes,
    pub rx: broadcast::Receiver<Bytes>,
}

impl Subscription {
    pub fn new(channel: Bytes, rx: broadcast::Receiver<Bytes>) -> Self {
        Self { channel, rx }
    }
}

/// Formats a published payload as a RESP push message:
/// `["message", <channel>, <payload>]`.
pub fn message_frame(channel: &Bytes, payload: Bytes) -> RespFrame {
    RespFrame::Array(vec![
        RespFrame::BulkString(Bytes::from_static(b"message")),
        RespFrame::BulkString(channel.clone()),
        RespFrame::BulkString(payload),
    ])
}

/// Waits for the next message on any of `subscriptions`.
///
/// Returns the index of the subscription that fired along with the push frame
/// or the receive error. Pends forever when there are no subscriptions, so it
/// is safe to use as a `select!` branch.
pub async fn receive_message(
    subscriptions: &mut [Subscription],
) -> (usize, Result<RespFrame, broadcast::error::RecvError>) {
    if subscriptions.is_empty() {
        return futures::future::pending().await;
    }

    let select_all = futures::future::select_all(subscriptions.iter_mut().map(|sub| {
        async move {
            let Subscription { channel, rx } = sub;
            rx.recv().await.map(|payload| message_frame(channel, payload))
        }
        .boxed()
    }));

    let (result, index, _remaining) = select_all.await;
    (index, result)
}
