//! Error types raised by the persistence data model.
//!
//! Every variant here is a programmer or content-authoring defect. None of
//! them describe a recoverable runtime condition, so callers are expected to
//! propagate rather than retry.

use thiserror::Error;

use crate::bundle::CapabilityKind;
use crate::identity::Identity;

/// A capsule did not have the shape its capability expected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CapsuleError {
    #[error("capsule is missing field `{field}`")]
    MissingField { field: String },

    #[error("capsule field `{field}` holds {found}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("record must serialize to a map of named fields, got {found}")]
    NotARecord { found: &'static str },

    #[error("field `{field}` holds a value capsules cannot represent: {reason}")]
    Unrepresentable { field: String, reason: String },

    #[error("capsule does not decode as the requested record: {0}")]
    Record(String),
}

/// Invalid entity or registry configuration, caught when it is assembled.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("identity token must not be empty")]
    EmptyIdentity,

    #[error("entity {identity} already has a capability of kind `{kind}`")]
    KindCollision {
        identity: Identity,
        kind: CapabilityKind,
    },

    #[error("identity {0} is already registered by another entity")]
    IdentityCollision(Identity),
}

/// Failure while capturing or restoring one entity's capabilities.
#[derive(Debug, Error)]
pub enum EntityError {
    /// A capability was handed a capsule of the wrong shape.
    #[error("capability `{kind}` on entity {identity} rejected its capsule")]
    TypeMismatch {
        identity: Identity,
        kind: CapabilityKind,
        #[source]
        source: CapsuleError,
    },

    #[error("capability `{kind}` on entity {identity} has a poisoned lock")]
    LockPoisoned {
        identity: Identity,
        kind: CapabilityKind,
    },
}
