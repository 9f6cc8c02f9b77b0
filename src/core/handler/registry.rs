// src/core/handler/registry.rs

//! The table of verbs the server answers.

use crate::core::commands::{CommandHint, CommandSpec, Handler};
use indexmap::IndexMap;

/// A registered verb: its handler and whether AUTH must come first.
#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub handler: Handler,
    pub requires_auth: bool,
}

/// Maps uppercase verbs to their handlers, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    entries: IndexMap<String, CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under its uppercased name. A later registration of
    /// the same name replaces the earlier one.
    pub fn register(&mut self, handler: impl Into<Handler>, requires_auth: bool) {
        let handler = handler.into();
        let key = handler.name().to_ascii_uppercase();
        self.entries.insert(
            key,
            CommandEntry {
                handler,
                requires_auth,
            },
        );
    }

    /// Looks up a verb case-insensitively.
    pub fn get(&self, verb: &str) -> Option<&CommandEntry> {
        self.entries.get(verb.to_ascii_uppercase().as_str())
    }

    pub fn contains(&self, verb: &str) -> bool {
        self.get(verb).is_some()
    }

    /// Introspection records for every verb, in registration order.
    pub fn list_commands(&self) -> Vec<CommandHint> {
        self.entries.values().map(|e| e.handler.hint()).collect()
    }

    pub fn hint(&self, verb: &str) -> Option<CommandHint> {
        self.get(verb).map(|e| e.handler.hint())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
