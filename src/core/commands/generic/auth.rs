// src/core/commands/generic/auth.rs

use crate::core::commands::command_spec::{CommandFlags, CommandSpec};
use crate::core::commands::command_trait::{ExecutableCommand, ExecutionContext};
use crate::core::commands::helpers::check_arg_count;
use crate::core::{CraftError, Reply};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, warn};

/// `AUTH [username] password`
///
/// A wrong password is answered with a null reply rather than an error, so a
/// client can tell a rejected password apart from a malformed request.
#[derive(Debug, Clone, Default)]
pub struct Auth;

#[async_trait]
impl ExecutableCommand for Auth {
    async fn execute<'a>(
        &self,
        ctx: &mut ExecutionContext<'a>,
        args: &[Bytes],
    ) -> Result<Reply, CraftError> {
        check_arg_count("AUTH", args, 1, 2)?;
        // With the two-argument form the username is ignored.
        let password = &args[args.len() - 1];

        let conn = ctx.session.id;
        if ctx.state.auth.authenticate(conn, password) {
            info!(session_id = conn, "Client authenticated");
            Ok(Reply::ok())
        } else {
            warn!(session_id = conn, "Rejected AUTH attempt");
            Ok(Reply::Null)
        }
    }
}

impl CommandSpec for Auth {
    fn name(&self) -> &str {
        "auth"
    }
    fn arity(&self) -> i64 {
        -2
    }
    fn flags(&self) -> CommandFlags {
        CommandFlags::NO_SCRIPT | CommandFlags::LOADING | CommandFlags::STALE | CommandFlags::FAST
    }
    fn categories(&self) -> Vec<String> {
        vec!["@fast".into(), "@connection".into()]
    }
}
