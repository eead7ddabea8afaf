//! Stable per-entity identity tokens.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

/// Opaque, durable token naming one persistable entity.
///
/// Identities are assigned once (at authoring time, or by an explicit
/// [`Identity::generate`]) and are the primary key of a save file. They are
/// never derived from runtime state, so they survive restarts and rebuilds.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Wraps an authored token.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::EmptyIdentity);
        }
        Ok(Self(token))
    }

    /// Creates a fresh random token (UUID v4, hyphenated).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identity {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl TryFrom<&str> for Identity {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_tokens() {
        assert_eq!(Identity::new(""), Err(ConfigError::EmptyIdentity));
        assert_eq!(Identity::new("   "), Err(ConfigError::EmptyIdentity));
    }

    #[test]
    fn generated_tokens_are_distinct_uuids() {
        let a = Identity::generate();
        let b = Identity::generate();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn decoding_rejects_blank_tokens() {
        assert!(serde_json::from_str::<Identity>("\"  \"").is_err());

        let id: Identity = serde_json::from_str("\"tunnel-gate\"").unwrap();
        assert_eq!(id.as_str(), "tunnel-gate");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"tunnel-gate\"");
    }

    #[test]
    fn authored_token_is_kept_verbatim() {
        let id = Identity::new("asylum-door-3").unwrap();
        assert_eq!(id.to_string(), "asylum-door-3");
    }
}
