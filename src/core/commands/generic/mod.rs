// src/core/commands/generic/mod.rs

//! Verbs answered by the bridge itself rather than the game server.

pub mod auth;
pub mod command;
pub mod ping;
pub mod subscribe;

pub use auth::Auth;
pub use command::CommandInfo;
pub use ping::Ping;
pub use subscribe::Subscribe;
