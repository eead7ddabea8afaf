//! Error types raised by save slot repositories.

use thiserror::Error;

use crate::codec::CodecError;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("save slot lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl RepositoryError {
    /// True when the stored bytes exist but cannot be decoded.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Codec(e) if e.is_corruption())
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
