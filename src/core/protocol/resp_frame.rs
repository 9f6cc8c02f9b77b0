// src/core/protocol/resp_frame.rs

//! Implements the RESP (REdis Serialization Protocol) frame structure and the
//! corresponding `Encoder` and `Decoder` for network communication.
//!
//! Besides regular RESP arrays the decoder accepts inline commands, i.e. a
//! bare text line such as `PING\r\n`, so the console can be driven from
//! `telnet` or `nc`.

use crate::core::CraftError;
use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The CRLF (Carriage Return, Line Feed) sequence used to terminate lines in RESP.
const CRLF: &[u8] = b"\r\n";
const CRLF_LEN: usize = 2;

// Protocol-level limits to prevent denial-of-service attacks.
const MAX_FRAME_ELEMENTS: usize = 1_024 * 1_024; // Max elements in an array.
const MAX_BULK_STRING_SIZE: usize = 512 * 1024 * 1024; // 512MB max bulk string size.
const MAX_RECURSION_DEPTH: usize = 256; // Limit recursion to prevent stack overflow.
const MAX_INLINE_SIZE: usize = 64 * 1024;

/// An enum representing a single frame in the RESP protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    Null,
    NullArray,
    Array(Vec<RespFrame>),
}

/// A `tokio_util::codec` implementation for encoding and decoding `RespFrame`s.
#[derive(Debug, Default, Clone, Copy)]
pub struct RespFrameCodec;

impl Encoder<RespFrame> for RespFrameCodec {
    type Error = CraftError;

    fn encode(&mut self, item: RespFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            RespFrame::SimpleString(s) => {
                dst.extend_from_slice(b"+");
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Error(s) => {
                dst.extend_from_slice(b"-");
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Integer(i) => {
                dst.extend_from_slice(b":");
                dst.extend_from_slice(i.to_string().as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::BulkString(b) => {
                dst.extend_from_slice(b"$");
                dst.extend_from_slice(b.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                dst.extend_from_slice(&b);
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Null => {
                dst.extend_from_slice(b"$-1\r\n");
            }
            RespFrame::NullArray => {
                dst.extend_from_slice(b"*-1\r\n");
            }
            RespFrame::Array(arr) => {
                dst.extend_from_slice(b"*");
                dst.extend_from_slice(arr.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                for frame in arr {
                    self.encode(frame, dst)?;
                }
            }
        }
        Ok(())
    }
}

impl Decoder for RespFrameCodec {
    type Item = RespFrame;
    type Error = CraftError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.is_empty() {
                return Ok(None);
            }

            if !is_type_prefix(src[0]) {
                let Some(pos) = src.iter().position(|b| *b == b'\n') else {
                    if src.len() > MAX_INLINE_SIZE {
                        return Err(CraftError::InvalidRequest(
                            "too big inline request".to_string(),
                        ));
                    }
                    return Ok(None);
                };
                let line = src.split_to(pos + 1);
                let args = parse_inline(&line);
                // Blank lines are ignored, just like redis-server does.
                if args.is_empty() {
                    continue;
                }
                return Ok(Some(RespFrame::Array(args)));
            }

            let mut bytes = &src[..];
            return match self.decode_recursive(&mut bytes, 0) {
                Ok(frame) => {
                    let len = src.len() - bytes.len();
                    src.advance(len);
                    Ok(Some(frame))
                }
                // `IncompleteData` only means we need to wait for more bytes.
                Err(CraftError::IncompleteData) => Ok(None),
                Err(e) => Err(e),
            };
        }
    }
}

impl RespFrameCodec {
    /// Decodes one frame, advancing `bytes` past whatever was consumed.
    fn decode_recursive(&self, bytes: &mut &[u8], depth: usize) -> Result<RespFrame, CraftError> {
        if depth > MAX_RECURSION_DEPTH {
            return Err(CraftError::InvalidRequest(
                "RESP recursion depth limit exceeded".to_string(),
            ));
        }

        if bytes.is_empty() {
            return Err(CraftError::IncompleteData);
        }

        match bytes[0] {
            b'+' => self.parse_simple_string(bytes),
            b'-' => self.parse_error(bytes),
            b':' => self.parse_integer(bytes),
            b'$' => self.parse_bulk_string(bytes),
            b'*' => self.parse_array(bytes, depth),
            _ => Err(CraftError::SyntaxError),
        }
    }

    /// Returns the next CRLF-terminated line and advances past it.
    fn parse_line<'a>(&self, bytes: &mut &'a [u8]) -> Result<&'a [u8], CraftError> {
        if let Some(pos) = find_crlf(bytes) {
            let line = &bytes[..pos];
            *bytes = &bytes[pos + CRLF_LEN..];
            Ok(line)
        } else {
            Err(CraftError::IncompleteData)
        }
    }

    fn parse_simple_string(&self, bytes: &mut &[u8]) -> Result<RespFrame, CraftError> {
        *bytes = &bytes[1..];
        let line = self.parse_line(bytes)?;
        Ok(RespFrame::SimpleString(
            String::from_utf8_lossy(line).to_string(),
        ))
    }

    fn parse_error(&self, bytes: &mut &[u8]) -> Result<RespFrame, CraftError> {
        *bytes = &bytes[1..];
        let line = self.parse_line(bytes)?;
        Ok(RespFrame::Error(String::from_utf8_lossy(line).to_string()))
    }

    fn parse_integer(&self, bytes: &mut &[u8]) -> Result<RespFrame, CraftError> {
        *bytes = &bytes[1..];
        let line = self.parse_line(bytes)?;
        let s = String::from_utf8_lossy(line);
        let i = s.parse::<i64>().map_err(|_| CraftError::SyntaxError)?;
        Ok(RespFrame::Integer(i))
    }

    /// Parses a Bulk String (e.g., `$5\r\nhello\r\n`).
    fn parse_bulk_string(&self, bytes: &mut &[u8]) -> Result<RespFrame, CraftError> {
        *bytes = &bytes[1..];
        let line = self.parse_line(bytes)?;
        let s = String::from_utf8_lossy(line);
        let str_len = s.parse::<isize>().map_err(|_| CraftError::SyntaxError)?;

        if str_len == -1 {
            return Ok(RespFrame::Null);
        }
        if str_len < 0 {
            return Err(CraftError::SyntaxError);
        }

        let str_len = str_len as usize;
        if str_len > MAX_BULK_STRING_SIZE {
            return Err(CraftError::SyntaxError);
        }

        if bytes.len() < str_len + CRLF_LEN {
            return Err(CraftError::IncompleteData);
        }

        if &bytes[str_len..str_len + CRLF_LEN] != CRLF {
            return Err(CraftError::SyntaxError);
        }

        let data = Bytes::copy_from_slice(&bytes[..str_len]);
        *bytes = &bytes[str_len + CRLF_LEN..];
        Ok(RespFrame::BulkString(data))
    }

    /// Parses an Array (e.g., `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`).
    fn parse_array(&self, bytes: &mut &[u8], depth: usize) -> Result<RespFrame, CraftError> {
        *bytes = &bytes[1..];
        let line = self.parse_line(bytes)?;
        let s = String::from_utf8_lossy(line);
        let arr_len = s.parse::<isize>().map_err(|_| CraftError::SyntaxError)?;

        if arr_len == -1 {
            return Ok(RespFrame::NullArray);
        }
        if arr_len < 0 {
            return Err(CraftError::SyntaxError);
        }

        let arr_len = arr_len as usize;
        if arr_len > MAX_FRAME_ELEMENTS {
            return Err(CraftError::SyntaxError);
        }

        let mut frames = Vec::with_capacity(arr_len.min(1024));
        for _ in 0..arr_len {
            frames.push(self.decode_recursive(bytes, depth + 1)?);
        }
        Ok(RespFrame::Array(frames))
    }
}

fn is_type_prefix(b: u8) -> bool {
    matches!(b, b'+' | b'-' | b':' | b'$' | b'*')
}

/// Splits an inline command line on ASCII whitespace into bulk strings.
fn parse_inline(line: &[u8]) -> Vec<RespFrame> {
    line.split(|b| b.is_ascii_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| RespFrame::BulkString(Bytes::copy_from_slice(part)))
        .collect()
}

fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(CRLF_LEN).position(|window| window == CRLF)
}
