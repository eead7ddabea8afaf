//! Unified error type surfaced by the save system.
//!
//! Missing save data is never an error here; it shows up as an outcome
//! (`LoadOutcome::NoSave`, `ContinueOutcome::NoSavedGame`). Everything in
//! [`SaveError`] propagates to the caller.

use save_core::{ConfigError, EntityError};
use thiserror::Error;

pub use crate::prefs::PreferenceError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, SaveError>;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to persist session metadata")]
    Preferences(#[from] PreferenceError),
}

impl SaveError {
    /// The save slot holds bytes that do not decode.
    ///
    /// Callers choose a policy: start fresh via `new_game`, or halt.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Repository(e) if e.is_corruption())
    }

    /// A build or content defect: wrong capsule shape, duplicate kind or
    /// duplicate identity.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::Entity(EntityError::TypeMismatch { .. }) | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use save_core::Identity;

    #[test]
    fn classifiers() {
        let corrupt = SaveError::from(RepositoryError::from(CodecError::BadMagic));
        assert!(corrupt.is_corruption());
        assert!(!corrupt.is_contract_violation());

        let collision =
            SaveError::from(ConfigError::IdentityCollision(Identity::new("a").unwrap()));
        assert!(collision.is_contract_violation());
        assert!(!collision.is_corruption());

        let io = SaveError::from(RepositoryError::Io(std::io::Error::other("disk full")));
        assert!(!io.is_corruption());
    }
}
