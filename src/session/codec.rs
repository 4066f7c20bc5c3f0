//! MessagePack codec for session documents.
//!
//! Session values are written as a single MessagePack map. The encoded form is
//! capped at [`MAX_LENGTH`] bytes; the cap is enforced on the write path only.

use super::types::SessionValues;
use crate::error::{Result, SessionError};

/// Largest encoded session document accepted for writing (1 MiB).
pub const MAX_LENGTH: usize = 1 << 20;

/// Encode session values, rejecting documents over [`MAX_LENGTH`].
pub fn encode(values: &SessionValues) -> Result<Vec<u8>> {
    let data = rmp_serde::to_vec(values).map_err(SessionError::Encoding)?;
    if data.len() > MAX_LENGTH {
        return Err(SessionError::MaxLengthExceeded {
            actual: data.len(),
            limit: MAX_LENGTH,
        });
    }
    Ok(data)
}

/// Decode a stored session document.
pub fn decode(data: &[u8]) -> Result<SessionValues> {
    rmp_serde::from_slice(data).map_err(SessionError::Decoding)
}
