// src/connection/session.rs

//! Defines the state associated with a single client session.

use crate::core::pubsub::Subscription;
use crate::core::state::ConnectionId;

/// Holds the state specific to a single client session. Authentication lives
/// in the shared `AuthGate`, keyed by `id`.
#[derive(Debug)]
pub struct SessionState {
    pub id: ConnectionId,
    /// Active channel subscriptions, polled by the connection loop.
    pub subscriptions: Vec<Subscription>,
}

impl SessionState {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            subscriptions: Vec::new(),
        }
    }
}
