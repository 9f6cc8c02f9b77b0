// src/core/protocol/request.rs

//! Turns a decoded frame into a `Request` the dispatcher understands.

use super::RespFrame;
use crate::core::CraftError;
use bytes::Bytes;

/// A single client request: the verb as sent by the client and its raw arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub verb: String,
    pub args: Vec<Bytes>,
}

impl Request {
    pub fn new(verb: impl Into<String>, args: Vec<Bytes>) -> Self {
        Self {
            verb: verb.into(),
            args,
        }
    }
}

impl TryFrom<RespFrame> for Request {
    type Error = CraftError;

    fn try_from(frame: RespFrame) -> Result<Self, Self::Error> {
        let RespFrame::Array(items) = frame else {
            return Err(CraftError::InvalidRequest(
                "requests must be sent as an array of strings".into(),
            ));
        };

        let mut parts = items.into_iter().map(|item| match item {
            RespFrame::BulkString(b) => Ok(b),
            RespFrame::SimpleString(s) => Ok(Bytes::from(s)),
            other => Err(CraftError::InvalidRequest(format!(
                "unexpected element in request: {other:?}"
            ))),
        });

        let verb = match parts.next() {
            Some(verb) => String::from_utf8(verb?.to_vec())?,
            None => return Err(CraftError::InvalidRequest("empty command".into())),
        };
        let args = parts.collect::<Result<Vec<_>, _>>()?;

        Ok(Request { verb, args })
    }
}
