// src/core/commands/console.rs

//! Pass-through handler for catalog verbs: the request is rebuilt as a console
//! line and queued for the game server.

use crate::core::catalog::CatalogEntry;
use crate::core::commands::command_spec::{CommandFlags, CommandSpec};
use crate::core::commands::command_trait::{ExecutableCommand, ExecutionContext};
use crate::core::{CraftError, Reply};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleCommand {
    name: String,
    grammar: String,
    required_args: usize,
}

impl ConsoleCommand {
    pub fn new(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.to_ascii_lowercase(),
            grammar: entry.grammar.clone(),
            required_args: entry.required_args(),
        }
    }

    pub fn grammar(&self) -> &str {
        &self.grammar
    }

    /// Builds the console line, e.g. `/gamemode survival`.
    pub fn render(&self, args: &[Bytes]) -> String {
        let mut line = format!("/{}", self.name);
        for arg in args {
            line.push(' ');
            line.push_str(&String::from_utf8_lossy(arg));
        }
        line
    }
}

#[async_trait]
impl ExecutableCommand for ConsoleCommand {
    /// Queues the command; the game's answer shows up on the output channel,
    /// so the reply itself is null.
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
        args: &[Bytes],
    ) -> Result<Reply, CraftError> {
        // A line break inside an argument would smuggle extra console lines.
        if args.iter().any(|arg| arg.contains(&b'\r') || arg.contains(&b'\n')) {
            return Err(CraftError::InvalidRequest(format!(
                "arguments for '{}' cannot contain CR or LF",
                self.name
            )));
        }
        ctx.state.bridge.enqueue(self.render(args));
        Ok(Reply::Null)
    }
}

impl CommandSpec for ConsoleCommand {
    fn name(&self) -> &str {
        &self.name
    }
    fn arity(&self) -> i64 {
        -(1 + self.required_args as i64)
    }
    fn flags(&self) -> CommandFlags {
        CommandFlags::ADMIN | CommandFlags::NO_SCRIPT
    }
    fn categories(&self) -> Vec<String> {
        vec!["@admin".into(), "@console".into()]
    }
}

impl From<&CatalogEntry> for ConsoleCommand {
    fn from(entry: &CatalogEntry) -> Self {
        ConsoleCommand::new(entry)
    }
}
