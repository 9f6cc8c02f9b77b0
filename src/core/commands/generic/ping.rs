// src/core/commands/generic/ping.rs

use crate::core::commands::command_spec::{CommandFlags, CommandSpec};
use crate::core::commands::command_trait::{ExecutableCommand, ExecutionContext};
use crate::core::commands::helpers::check_arg_count;
use crate::core::{CraftError, Reply};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct Ping;

#[async_trait]
impl ExecutableCommand for Ping {
    async fn execute<'a>(
        &self,
        _ctx: &mut ExecutionContext<'a>,
        args: &[Bytes],
    ) -> Result<Reply, CraftError> {
        check_arg_count("PING", args, 0, 1)?;
        let resp = match args.first() {
            Some(msg) => Reply::BulkString(msg.clone()),
            None => Reply::simple("PONG"),
        };
        Ok(resp)
    }
}

impl CommandSpec for Ping {
    fn name(&self) -> &str {
        "ping"
    }
    fn arity(&self) -> i64 {
        -1
    }
    fn flags(&self) -> CommandFlags {
        CommandFlags::STALE | CommandFlags::FAST
    }
    fn categories(&self) -> Vec<String> {
        vec!["@stale".into(), "@fast".into()]
    }
}
