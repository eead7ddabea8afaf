//! Persistence data model and capability contract shared across crates.
//!
//! `save-core` defines what a snapshot *is* without deciding how it is stored.
//! Gameplay components implement [`Capability`], entities aggregate them in
//! a [`SaveableEntity`] under a stable [`Identity`], and the resulting
//! [`EntityBundle`]s are merged into a [`SaveFile`] by the runtime crate.
//!
//! Modules are organized leaves first:
//! - [`capsule`] holds [`StateCapsule`], the smallest unit of data at rest
//! - [`identity`] and [`bundle`] define the keys and maps of a save file
//! - [`capability`] is the two-operation contract implemented by components
//! - [`entity`] aggregates one entity's capabilities into one bundle
pub mod bundle;
pub mod capability;
pub mod capsule;
pub mod entity;
pub mod error;
pub mod identity;

pub use bundle::{CapabilityKind, EntityBundle, SaveFile};
pub use capability::{Capability, CapabilityHandle, shared};
pub use capsule::{CapsuleBuilder, FieldValue, StateCapsule};
pub use entity::{SaveableEntity, SaveableEntityBuilder};
pub use error::{CapsuleError, ConfigError, EntityError};
pub use identity::Identity;
