// src/core/pubsub/mod.rs

//! The publish-subscribe fan-out that carries process output to clients.
//!
//! Every channel is backed by a `tokio::sync::broadcast` sender; each
//! subscribed connection holds its own receiver. Which connections are
//! subscribed to which channel is tracked here as well, so subscribing is
//! idempotent and a disconnect can be cleaned up in one call.

use crate::core::state::ConnectionId;
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::debug;

pub mod channel_purger;
pub mod output_forwarder;
pub mod handler;

pub use handler::{Subscription, receive_message};

/// The capacity of each individual broadcast channel. A subscriber that falls
/// further behind than this loses the oldest messages.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
pub struct PubSubManager {
    /// A map from a channel name to its broadcast sender.
    channels: DashMap<Bytes, Arc<Sender<Bytes>>>,
    /// The set of connections subscribed to each channel.
    subscribers: DashMap<Bytes, HashSet<ConnectionId>>,
}

impl PubSubManager {
    pub fn new() -> Self {
        Default::default()
    }

    /// Subscribes `conn` to `channel`.
    ///
    /// Returns a receiver the first time; `None` if `conn` was already
    /// subscribed, in which case its existing receiver keeps working.
    pub fn subscribe(&self, conn: ConnectionId, channel: &Bytes) -> Option<Receiver<Bytes>> {
        let mut members = self.subscribers.entry(channel.clone()).or_default();
        if !members.insert(conn) {
            return None;
        }
        let rx = self
            .channels
            .entry(channel.clone())
            .or_insert_with(|| Arc::new(broadcast::channel(CHANNEL_CAPACITY).0))
            .value()
            .subscribe();
        Some(rx)
    }

    /// Publishes a message to every receiver currently attached to `channel`.
    ///
    /// Returns the number of receivers the message was handed to.
    pub fn publish(&self, channel: &Bytes, message: Bytes) -> usize {
        match self.channels.get(channel) {
            Some(sender) => sender.send(message).unwrap_or(0),
            None => 0,
        }
    }

    /// Drops `conn` from every channel's subscriber set.
    ///
    /// Returns how many channels it was removed from.
    pub fn remove_connection(&self, conn: ConnectionId) -> usize {
        let mut removed = 0;
        self.subscribers.retain(|_channel, members| {
            if members.remove(&conn) {
                removed += 1;
            }
            !members.is_empty()
        });
        removed
    }

    pub fn is_subscribed(&self, conn: ConnectionId, channel: &Bytes) -> bool {
        self.subscribers
            .get(channel)
            .is_some_and(|members| members.contains(&conn))
    }

    /// Returns the number of connections subscribed to `channel`.
    pub fn subscriber_count(&self, channel: &Bytes) -> usize {
        self.subscribers.get(channel).map_or(0, |members| members.len())
    }

    /// Returns a list of all channels that currently have a sender.
    pub fn channels(&self) -> Vec<Bytes> {
        self.channels.iter().map(|e| e.key().clone()).collect()
    }

    /// Removes channel senders that no longer have any receiver attached.
    pub fn purge_empty_channels(&self) -> usize {
        let mut purged_count = 0;
        self.channels.retain(|_channel, sender| {
            if sender.receiver_count() == 0 {
                purged_count += 1;
                false
            } else {
                true
            }
        });

        if purged_count > 0 {
            debug!("Purged {} empty Pub/Sub channels.", purged_count);
        }
        purged_count
    }
}
