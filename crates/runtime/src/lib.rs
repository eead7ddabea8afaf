//! Save/load runtime for persistable entities.
//!
//! This crate wires the data model from `save-core` into a working save
//! system: a self-checking binary codec, a single save slot on disk, an
//! explicit entity registry, the readiness gate and a small preference store
//! for session metadata and settings. Consumers build a [`SaveSystem`],
//! register their entities and call `save`/`load` from the host loop.
//!
//! Modules are organized by responsibility:
//! - [`system`] hosts the orchestrator and builder
//! - [`codec`] and [`repository`] own the bytes at rest
//! - [`registry`] and [`gate`] describe the live scene
//! - [`events`] carries notices to UI collaborators
//! - [`prefs`] keeps key-value preferences outside the save file
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod prefs;
pub mod registry;
pub mod repository;
pub mod system;

pub use codec::CodecError;
pub use config::SaveConfig;
pub use error::{Result, SaveError};
pub use events::{SaveEvent, SaveEvents};
pub use gate::{AlwaysReady, ReadinessGate, ReadyFlag};
pub use prefs::{
    PrefValue, PreferenceError, PreferenceStore, SessionMetadata, Settings, SettingsGroup,
};
pub use registry::EntityRegistry;
pub use repository::{FileSaveRepository, InMemorySaveRepo, RepositoryError, SaveRepository};
pub use system::{
    ContinueOutcome, LoadOutcome, LoadReport, SaveOutcome, SaveRequest, SaveSystem,
    SaveSystemBuilder,
};
