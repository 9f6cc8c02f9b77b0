// src/core/handler/dispatcher.rs

//! Routes a decoded request to its handler.
//!
//! The pipeline is short: resolve the verb, enforce authentication for verbs
//! that need it, then execute inside a `command` span. Every step that fails
//! produces a `CraftError` which the connection turns into an error reply.

use crate::connection::SessionState;
use crate::core::commands::command_trait::{ExecutableCommand, ExecutionContext};
use crate::core::state::ServerState;
use crate::core::{CraftError, Reply, Request};
use tracing::{Instrument, debug, info_span};

pub struct Dispatcher<'a> {
    state: &'a ServerState,
    session: &'a mut SessionState,
}

impl<'a> Dispatcher<'a> {
    pub fn new(state: &'a ServerState, session: &'a mut SessionState) -> Self {
        Self { state, session }
    }

    /// Executes one request and returns its reply.
    pub async fn dispatch(&mut self, request: Request) -> Result<Reply, CraftError> {
        self.state.stats.increment_total_commands();
        let verb = request.verb.to_ascii_uppercase();

        let Some(entry) = self.state.registry.get(&verb) else {
            debug!(session_id = self.session.id, verb = %verb, "Unknown command");
            return Err(CraftError::UnknownCommand(request.verb.to_ascii_lowercase()));
        };

        if entry.requires_auth && !self.state.auth.is_authenticated(self.session.id) {
            debug!(session_id = self.session.id, verb = %verb, "Rejected unauthenticated command");
            return Err(CraftError::NotAuthenticated);
        }

        let span = info_span!(
            "command",
            name = %verb,
            client.id = %self.session.id,
        );

        let mut ctx = ExecutionContext {
            state: self.state,
            session: &mut *self.session,
        };
        entry
            .handler
            .execute(&mut ctx, &request.args)
            .instrument(span)
            .await
    }
}
