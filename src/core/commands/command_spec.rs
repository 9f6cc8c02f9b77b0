// src/core/commands/command_spec.rs

//! Defines the `CommandSpec` trait, which provides the static metadata about a
//! command that the `COMMAND` verb reports.

use crate::core::protocol::Reply;
use bitflags::bitflags;

bitflags! {
    /// Flags that describe the properties of a command, as reported by `COMMAND`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CommandFlags: u32 {
        const WRITE           = 1 << 0;
        const READONLY        = 1 << 1;
        const DENY_OOM        = 1 << 2;
        const ADMIN           = 1 << 3;
        const PUBSUB          = 1 << 4;
        const NO_SCRIPT       = 1 << 5;
        const RANDOM          = 1 << 6;
        const SORT_FOR_SCRIPT = 1 << 7;
        const LOADING         = 1 << 8;
        const STALE           = 1 << 9;
        const SKIP_MONITOR    = 1 << 10;
        const ASKING          = 1 << 11;
        const FAST            = 1 << 12;
        const MOVABLEKEYS     = 1 << 13;
    }
}

/// Wire names of each flag, in the order Redis lists them.
const FLAG_NAMES: &[(CommandFlags, &str)] = &[
    (CommandFlags::WRITE, "write"),
    (CommandFlags::READONLY, "readonly"),
    (CommandFlags::DENY_OOM, "denyoom"),
    (CommandFlags::ADMIN, "admin"),
    (CommandFlags::PUBSUB, "pubsub"),
    (CommandFlags::NO_SCRIPT, "noscript"),
    (CommandFlags::RANDOM, "random"),
    (CommandFlags::SORT_FOR_SCRIPT, "sort_for_script"),
    (CommandFlags::LOADING, "loading"),
    (CommandFlags::STALE, "stale"),
    (CommandFlags::SKIP_MONITOR, "skip_monitor"),
    (CommandFlags::ASKING, "asking"),
    (CommandFlags::FAST, "fast"),
    (CommandFlags::MOVABLEKEYS, "movablekeys"),
];

impl CommandFlags {
    /// Returns the wire names of all set flags.
    pub fn names(&self) -> Vec<&'static str> {
        FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// A trait for describing a command's properties, such as its name, arity,
/// flags and key positions.
pub trait CommandSpec {
    /// The name of the command in lowercase.
    fn name(&self) -> &str;

    /// The arity of the command, counting the verb itself.
    /// - Positive integer: fixed number of arguments.
    /// - Negative integer: minimum number of arguments (e.g., -2 for `AUTH password`).
    fn arity(&self) -> i64;

    fn flags(&self) -> CommandFlags;

    /// The position of the first key argument. None of the console's commands
    /// take keys, so the key positions default to zero.
    fn first_key(&self) -> i64 {
        0
    }

    fn last_key(&self) -> i64 {
        0
    }

    fn step(&self) -> i64 {
        0
    }

    /// ACL-style categories such as `@fast`.
    fn categories(&self) -> Vec<String> {
        Vec::new()
    }

    /// Collects the metadata above into an introspection record.
    fn hint(&self) -> CommandHint {
        CommandHint {
            name: self.name().to_ascii_lowercase(),
            arity: self.arity(),
            flags: self.flags(),
            first_key: self.first_key(),
            last_key: self.last_key(),
            step: self.step(),
            categories: self.categories(),
        }
    }
}

/// The introspection record for one verb, in the shape `COMMAND` returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHint {
    pub name: String,
    pub arity: i64,
    pub flags: CommandFlags,
    pub first_key: i64,
    pub last_key: i64,
    pub step: i64,
    pub categories: Vec<String>,
}

impl From<CommandHint> for Reply {
    /// `[name, arity, [flags...], first_key, last_key, step, [categories...]]`
    fn from(hint: CommandHint) -> Self {
        Reply::Array(vec![
            Reply::bulk(hint.name),
            Reply::Integer(hint.arity),
            Reply::Array(hint.flags.names().into_iter().map(Reply::simple).collect()),
            Reply::Integer(hint.first_key),
            Reply::Integer(hint.last_key),
            Reply::Integer(hint.step),
            Reply::Array(hint.categories.into_iter().map(Reply::simple).collect()),
        ])
    }
}
