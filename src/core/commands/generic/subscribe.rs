// src/core/commands/generic/subscribe.rs

use crate::core::commands::command_spec::{CommandFlags, CommandSpec};
use crate::core::commands::command_trait::{ExecutableCommand, ExecutionContext};
use crate::core::commands::helpers::check_arg_count;
use crate::core::pubsub::Subscription;
use crate::core::{CraftError, Reply};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

/// `SUBSCRIBE [channel]`
///
/// Subscribes the connection to `channel`, or to the process output channel
/// when no name is given. Messages are pushed to the connection as they are
/// published; the connection keeps accepting other commands meanwhile.
#[derive(Debug, Clone)]
pub struct Subscribe {
    default_channel: Bytes,
}

impl Subscribe {
    pub fn new(default_channel: impl Into<Bytes>) -> Self {
        Self {
            default_channel: default_channel.into(),
        }
    }
}

#[async_trait]
impl ExecutableCommand for Subscribe {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
        args: &[Bytes],
    ) -> Result<Reply, CraftError> {
        check_arg_count("SUBSCRIBE", args, 0, 1)?;
        let channel = args.first().unwrap_or(&self.default_channel).clone();

        let conn = ctx.session.id;
        if let Some(rx) = ctx.state.pubsub.subscribe(conn, &channel) {
            debug!(session_id = conn, channel = ?channel, "Subscribed");
            ctx.session
                .subscriptions
                .push(Subscription::new(channel.clone(), rx));
        }

        Ok(Reply::Array(vec![
            Reply::bulk("subscribe"),
            Reply::BulkString(channel),
            Reply::Integer(ctx.session.subscriptions.len() as i64),
        ]))
    }
}

impl CommandSpec for Subscribe {
    fn name(&self) -> &str {
        "subscribe"
    }
    fn arity(&self) -> i64 {
        -1
    }
    fn flags(&self) -> CommandFlags {
        CommandFlags::PUBSUB | CommandFlags::NO_SCRIPT | CommandFlags::LOADING | CommandFlags::STALE
    }
    fn categories(&self) -> Vec<String> {
        vec!["@pubsub".into(), "@slow".into()]
    }
}
