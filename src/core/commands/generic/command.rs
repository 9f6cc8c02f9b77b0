// src/core/commands/generic/command.rs

use crate::core::commands::command_spec::{CommandFlags, CommandSpec};
use crate::core::commands::command_trait::{ExecutableCommand, ExecutionContext};
use crate::core::commands::helpers::extract_string;
use crate::core::{CraftError, Reply};
use async_trait::async_trait;
use bytes::Bytes;

/// Implements the `COMMAND` introspection verb.
///
/// - `COMMAND` lists a hint for every registered verb.
/// - `COMMAND COUNT` returns how many verbs are registered.
/// - `COMMAND INFO name [name ...]` returns one hint per name, or null for
///   names that are not registered.
#[derive(Debug, Clone, Default)]
pub struct CommandInfo;

#[async_trait]
impl ExecutableCommand for CommandInfo {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
        args: &[Bytes],
    ) -> Result<Reply, CraftError> {
        let registry = &ctx.state.registry;

        let Some(subcommand) = args.first() else {
            let hints = registry.list_commands().into_iter().map(Reply::from);
            return Ok(Reply::Array(hints.collect()));
        };

        match extract_string(subcommand)?.to_ascii_uppercase().as_str() {
            "COUNT" => Ok(Reply::Integer(registry.len() as i64)),
            "INFO" => {
                let mut hints: Vec<Reply> = Vec::with_capacity(args.len() - 1);
                for name in &args[1..] {
                    let name = extract_string(name)?;
                    hints.push(registry.hint(&name).map(Reply::from).into());
                }
                Ok(Reply::Array(hints))
            }
            other => Err(CraftError::InvalidRequest(format!(
                "unknown subcommand '{other}' for 'command'"
            ))),
        }
    }
}

impl CommandSpec for CommandInfo {
    fn name(&self) -> &str {
        "command"
    }
    fn arity(&self) -> i64 {
        -1
    }
    fn flags(&self) -> CommandFlags {
        CommandFlags::LOADING | CommandFlags::STALE
    }
    fn categories(&self) -> Vec<String> {
        vec!["@slow".into(), "@connection".into()]
    }
}
