// Error types for registry operations.
//
// The Display strings double as the `error` field of the HTTP responses, so
// they must stay byte-for-byte stable.

use thiserror::Error;

/// Broad category of a [`DrawError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-domain request parameter.
    InvalidInput,
    /// Every number in `[1, max]` has already been drawn.
    Exhausted,
    /// The operation needs a non-empty Entry Set.
    InvalidState,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("Invalid max parameter")]
    InvalidMax,

    #[error("Invalid array parameter")]
    InvalidArray,

    #[error("All numbers have been drawn")]
    Exhausted,

    #[error("No entries have been drawn")]
    NoEntries,
}

impl DrawError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DrawError::InvalidMax | DrawError::InvalidArray => ErrorKind::InvalidInput,
            DrawError::Exhausted => ErrorKind::Exhausted,
            DrawError::NoEntries => ErrorKind::InvalidState,
        }
    }
}
