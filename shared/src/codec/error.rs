use scenesync_serde::SerdeErr;
use thiserror::Error;

/// Why a message could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("fewer than 8 bytes left for a message header ({remaining} remain)")]
    TruncatedHeader { remaining: usize },

    #[error("unknown message type {ordinal}")]
    UnknownType { ordinal: u32 },

    #[error("declared length {declared} is below the minimum {minimum} for its type")]
    LengthTooSmall { declared: u32, minimum: usize },

    #[error("declared length {declared} exceeds the {remaining} bytes left in the buffer")]
    LengthExceedsBuffer { declared: u32, remaining: usize },

    #[error("message body ended early: needed {needed} bytes, {remaining} remain")]
    TruncatedBody { needed: usize, remaining: usize },

    #[error("payload length {declared} does not match the {available} bytes left in the message")]
    DataLengthMismatch { declared: u32, available: usize },
}

impl From<SerdeErr> for MalformedReason {
    fn from(error: SerdeErr) -> Self {
        match error {
            SerdeErr::UnexpectedEnd { needed, remaining } => {
                Self::TruncatedBody { needed, remaining }
            }
        }
    }
}

/// Errors produced by the CRDT message codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The header declares a length/type combination that cannot be parsed.
    /// Nothing after `offset` in the same buffer is readable.
    #[error("Malformed CRDT message at offset {offset}: {reason}")]
    MalformedMessage {
        offset: usize,
        reason: MalformedReason,
    },
}

impl CodecError {
    pub(crate) fn malformed(offset: usize, reason: MalformedReason) -> Self {
        Self::MalformedMessage { offset, reason }
    }

    pub fn offset(&self) -> usize {
        match self {
            Self::MalformedMessage { offset, .. } => *offset,
        }
    }
}
