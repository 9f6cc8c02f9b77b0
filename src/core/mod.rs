// src/core/mod.rs

//! The central module containing the core logic of craftbridge: the stream
//! bridge to the game server, command dispatch, authentication, the output
//! fan-out and the process supervisor.

pub mod auth;
pub mod bridge;
pub mod catalog;
pub mod commands;
pub mod errors;
pub mod handler;
pub mod protocol;
pub mod pubsub;
pub mod state;
pub mod supervisor;

pub use errors::CraftError;
pub use protocol::{Reply, Request};
pub use state::{ConnectionId, ServerState};
