// src/core/handler/mod.rs

//! Verb lookup and the per-request dispatch pipeline.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use registry::{CommandEntry, CommandRegistry};
