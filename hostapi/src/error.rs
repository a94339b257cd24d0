//! Host-side error types for the LunX bridge.
//!
//! `HostError` is what a host handler produces when a guest call cannot be
//! honored. The guest never sees it: bridge calls have no return channel, so
//! the bridge logs the error, records it as a fault, and drops the call.

use crate::types::ObjectId;

/// Failure to turn a guest pointer into a host string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The pointer is negative or lies at or beyond the end of linear memory.
    #[error("pointer {ptr:#x} outside linear memory of {memory_len} bytes")]
    OutOfBounds { ptr: i32, memory_len: usize },

    /// No NUL byte was found before the scan limit.
    #[error("no NUL terminator within {scanned} bytes of {ptr:#x}")]
    Unterminated { ptr: i32, scanned: usize },
}

/// Host-side error returned by bridge handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// A string argument could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The call referenced a handle that was never spawned.
    #[error("unknown handle {0}")]
    UnknownHandle(ObjectId),

    /// A spawn reused a live handle while the bridge rejects duplicates.
    #[error("handle {0} already spawned")]
    DuplicateHandle(ObjectId),
}

impl HostError {
    /// Returns true for errors caused by reading guest memory.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = HostError::from(DecodeError::Unterminated { ptr: 16, scanned: 4 });
        assert_eq!(
            err.to_string(),
            "decode error: no NUL terminator within 4 bytes of 0x10"
        );
        assert!(err.is_decode());

        let err = HostError::UnknownHandle(ObjectId(42));
        assert_eq!(err.to_string(), "unknown handle #42");
        assert!(!err.is_decode());
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = DecodeError::OutOfBounds { ptr: -1, memory_len: 65536 };
        assert_eq!(
            err.to_string(),
            "pointer 0xffffffff outside linear memory of 65536 bytes"
        );
    }
}
