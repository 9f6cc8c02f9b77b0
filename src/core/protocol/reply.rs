// src/core/protocol/reply.rs

//! Defines the value type returned by command handlers.

use super::RespFrame;
use crate::core::CraftError;
use bytes::Bytes;

/// `Reply` is what a handler produces. It is a closed set of the shapes the
/// console can answer with and is rendered into a `RespFrame` just before it
/// goes out on the wire.
///
/// Sequences nest arbitrarily: the serializer walks them recursively and keeps
/// both element order and nesting depth.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    SimpleString(String),
    BulkString(Bytes),
    Integer(i64),
    Array(Vec<Reply>),
    Null,
}

impl Reply {
    /// The canonical `+OK` reply.
    pub fn ok() -> Self {
        Reply::SimpleString("OK".into())
    }

    pub fn bulk(s: impl Into<String>) -> Self {
        Reply::BulkString(Bytes::from(s.into()))
    }

    pub fn simple(s: impl Into<String>) -> Self {
        Reply::SimpleString(s.into())
    }

    /// Renders the reply into a wire frame.
    ///
    /// Fails with `CraftError::Serialization` when a value has no RESP
    /// encoding, which today means a simple string carrying CR or LF.
    pub fn into_frame(self) -> Result<RespFrame, CraftError> {
        match self {
            Reply::SimpleString(s) => {
                if s.contains(['\r', '\n']) {
                    return Err(CraftError::Serialization(format!(
                        "simple string cannot contain CR or LF: {s:?}"
                    )));
                }
                Ok(RespFrame::SimpleString(s))
            }
            Reply::BulkString(b) => Ok(RespFrame::BulkString(b)),
            Reply::Integer(i) => Ok(RespFrame::Integer(i)),
            Reply::Null => Ok(RespFrame::Null),
            Reply::Array(items) => items
                .into_iter()
                .map(Reply::into_frame)
                .collect::<Result<Vec<_>, _>>()
                .map(RespFrame::Array),
        }
    }
}

impl TryFrom<Reply> for RespFrame {
    type Error = CraftError;

    fn try_from(reply: Reply) -> Result<Self, CraftError> {
        reply.into_frame()
    }
}

impl From<i64> for Reply {
    fn from(i: i64) -> Self {
        Reply::Integer(i)
    }
}

impl From<Vec<Reply>> for Reply {
    fn from(items: Vec<Reply>) -> Self {
        Reply::Array(items)
    }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reply::Null, Into::into)
    }
}
