// src/core/state/mod.rs

//! Defines the central `ServerState` struct and its supporting pieces.

mod core;
mod stats;

pub use core::{ServerInit, ServerState};
pub use stats::StatsState;

/// Identifies one client connection for its whole lifetime. Ids are handed
/// out sequentially by the accept loop and never reused.
pub type ConnectionId = u64;
