// src/core/commands/mod.rs

//! This module defines every verb the bridge answers and the central `Handler`
//! enum that the registry stores. The `define_handlers!` macro generates the
//! enum along with the delegating `CommandSpec` and `ExecutableCommand` impls.

use crate::core::commands::command_trait::{ExecutableCommand, ExecutionContext};
use crate::core::{CraftError, Reply};
use async_trait::async_trait;
use bytes::Bytes;

pub use command_spec::{CommandFlags, CommandHint, CommandSpec};

pub mod command_spec;
pub mod command_trait;
pub mod console;
pub mod generic;
pub mod helpers;

use console::ConsoleCommand;
use generic::{Auth, CommandInfo, Ping, Subscribe};

macro_rules! define_handlers {
    ($( ($variant:ident, $ty:ty) ),* $(,)?) => {
        /// A registered verb handler. Dispatch goes through this enum so the
        /// registry can hold built-ins and catalog verbs side by side.
        #[derive(Debug, Clone)]
        pub enum Handler {
            $( $variant($ty), )*
        }

        impl CommandSpec for Handler {
            fn name(&self) -> &str {
                match self { $( Handler::$variant(h) => h.name(), )* }
            }
            fn arity(&self) -> i64 {
                match self { $( Handler::$variant(h) => h.arity(), )* }
            }
            fn flags(&self) -> CommandFlags {
                match self { $( Handler::$variant(h) => h.flags(), )* }
            }
            fn first_key(&self) -> i64 {
                match self { $( Handler::$variant(h) => h.first_key(), )* }
            }
            fn last_key(&self) -> i64 {
                match self { $( Handler::$variant(h) => h.last_key(), )* }
            }
            fn step(&self) -> i64 {
                match self { $( Handler::$variant(h) => h.step(), )* }
            }
            fn categories(&self) -> Vec<String> {
                match self { $( Handler::$variant(h) => h.categories(), )* }
            }
        }

        #[async_trait]
        impl ExecutableCommand for Handler {
            async fn execute<'a>(
                &self,
                ctx: &mut ExecutionContext<'a>,
                args: &[Bytes],
            ) -> Result<Reply, CraftError> {
                match self { $( Handler::$variant(h) => h.execute(ctx, args).await, )* }
            }
        }

        $(
            impl From<$ty> for Handler {
                fn from(handler: $ty) -> Self {
                    Handler::$variant(handler)
                }
            }
        )*
    };
}

define_handlers! {
    (Auth, Auth),
    (Ping, Ping),
    (Command, CommandInfo),
    (Subscribe, Subscribe),
    (Console, ConsoleCommand),
}
