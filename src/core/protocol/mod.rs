// src/core/protocol/mod.rs

pub mod reply;
pub mod request;
pub mod resp_frame;
pub use reply::Reply;
pub use request::Request;
pub use resp_frame::{RespFrame, RespFrameCodec};
