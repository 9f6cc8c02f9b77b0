// src/core/errors.rs

//! Defines the primary error type for the entire application.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// The main error enum, representing every failure a request or the supervised
/// process can produce.
///
/// The `Display` output of each variant is exactly the text sent back to the
/// client in a RESP error reply, so request-level variants carry the usual
/// Redis prefixes (`ERR`, `NOAUTH`).
#[derive(Error, Debug)]
pub enum CraftError {
    #[error("ERR IO error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("ERR incomplete data in stream")]
    IncompleteData,

    #[error("ERR Protocol error")]
    SyntaxError,

    #[error("ERR invalid request: {0}")]
    InvalidRequest(String),

    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArgumentCount(String),

    #[error("NOAUTH Authentication required")]
    NotAuthenticated,

    /// A handler produced a value that has no RESP encoding.
    #[error("ERR reply serialization failed: {0}")]
    Serialization(String),

    #[error("ERR failed to launch process: {0}")]
    ProcessLaunch(String),

    #[error("ERR process exited abnormally: {0}")]
    ProcessRuntime(String),

    /// The child did not exit within the graceful shutdown bound and was killed.
    #[error("ERR timed out after {}s waiting for the process to stop, killed it", .0.as_secs())]
    GracefulShutdownTimeout(Duration),

    #[error("ERR internal error: {0}")]
    Internal(String),
}

impl CraftError {
    /// Process-lifecycle errors end the whole run; everything else is scoped
    /// to a single request or connection.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CraftError::ProcessLaunch(_)
                | CraftError::ProcessRuntime(_)
                | CraftError::GracefulShutdownTimeout(_)
        )
    }
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
impl Clone for CraftError {
    fn clone(&self) -> Self {
        match self {
            CraftError::Io(e) => CraftError::Io(Arc::clone(e)),
            CraftError::IncompleteData => CraftError::IncompleteData,
            CraftError::SyntaxError => CraftError::SyntaxError,
            CraftError::InvalidRequest(s) => CraftError::InvalidRequest(s.clone()),
            CraftError::UnknownCommand(s) => CraftError::UnknownCommand(s.clone()),
            CraftError::WrongArgumentCount(s) => CraftError::WrongArgumentCount(s.clone()),
            CraftError::NotAuthenticated => CraftError::NotAuthenticated,
            CraftError::Serialization(s) => CraftError::Serialization(s.clone()),
            CraftError::ProcessLaunch(s) => CraftError::ProcessLaunch(s.clone()),
            CraftError::ProcessRuntime(s) => CraftError::ProcessRuntime(s.clone()),
            CraftError::GracefulShutdownTimeout(d) => CraftError::GracefulShutdownTimeout(*d),
            CraftError::Internal(s) => CraftError::Internal(s.clone()),
        }
    }
}

impl PartialEq for CraftError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CraftError::Io(e1), CraftError::Io(e2)) => e1.kind() == e2.kind(),
            (CraftError::InvalidRequest(s1), CraftError::InvalidRequest(s2)) => s1 == s2,
            (CraftError::UnknownCommand(s1), CraftError::UnknownCommand(s2)) => s1 == s2,
            (CraftError::WrongArgumentCount(s1), CraftError::WrongArgumentCount(s2)) => s1 == s2,
            (CraftError::Serialization(s1), CraftError::Serialization(s2)) => s1 == s2,
            (CraftError::ProcessLaunch(s1), CraftError::ProcessLaunch(s2)) => s1 == s2,
            (CraftError::ProcessRuntime(s1), CraftError::ProcessRuntime(s2)) => s1 == s2,
            (CraftError::GracefulShutdownTimeout(d1), CraftError::GracefulShutdownTimeout(d2)) => {
                d1 == d2
            }
            (CraftError::Internal(s1), CraftError::Internal(s2)) => s1 == s2,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for CraftError {
    fn from(e: std::io::Error) -> Self {
        CraftError::Io(Arc::new(e))
    }
}

impl From<std::string::FromUtf8Error> for CraftError {
    fn from(_: std::string::FromUtf8Error) -> Self {
        CraftError::InvalidRequest("arguments must be valid UTF-8".into())
    }
}

impl From<std::str::Utf8Error> for CraftError {
    fn from(_: std::str::Utf8Error) -> Self {
        CraftError::InvalidRequest("arguments must be valid UTF-8".into())
    }
}
