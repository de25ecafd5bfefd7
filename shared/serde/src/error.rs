use thiserror::Error;

/// Errors produced while reading from a [`ByteReader`](crate::ByteReader)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The buffer ended before the requested number of bytes could be read
    #[error("Unexpected end of buffer: needed {needed} bytes but only {remaining} remain")]
    UnexpectedEnd { needed: usize, remaining: usize },
}
