// src/core/commands/helpers.rs

//! Small helpers shared by the command handlers for argument handling.

use crate::core::CraftError;
use bytes::Bytes;

/// Decodes an argument as UTF-8, failing with `InvalidRequest` otherwise.
pub fn extract_string(arg: &Bytes) -> Result<String, CraftError> {
    Ok(std::str::from_utf8(arg)?.to_string())
}

/// Rejects calls whose argument count falls outside `min..=max`.
pub fn check_arg_count(
    command: &str,
    args: &[Bytes],
    min: usize,
    max: usize,
) -> Result<(), CraftError> {
    if args.len() < min || args.len() > max {
        return Err(CraftError::WrongArgumentCount(command.to_ascii_lowercase()));
    }
    Ok(())
}
