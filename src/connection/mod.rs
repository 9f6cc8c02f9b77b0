// src/connection/mod.rs

//! Manages the lifecycle of a single client connection: frame decoding,
//! dispatch, subscription pushes and cleanup.

mod guard;
mod handler;
mod session;

pub use guard::ConnectionGuard;
pub use handler::ConnectionHandler;
pub use session::SessionState;
