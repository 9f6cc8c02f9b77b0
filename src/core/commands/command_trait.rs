// src/core/commands/command_trait.rs

//! Defines the execution side of a command handler.

use crate::connection::SessionState;
use crate::core::state::ServerState;
use crate::core::{CraftError, Reply};
use async_trait::async_trait;
use bytes::Bytes;

/// Everything a handler may touch while executing: the shared server state and
/// the calling connection's session.
pub struct ExecutionContext<'a> {
    pub state: &'a ServerState,
    pub session: &'a mut SessionState,
}

/// A trait for the actual execution logic of a command.
#[async_trait]
pub trait ExecutableCommand {
    /// Runs the command. `args` excludes the verb itself.
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
        args: &[Bytes],
    ) -> Result<Reply, CraftError>;
}
