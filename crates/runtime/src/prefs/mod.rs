//! Key-value preferences that live outside the entity save file.
//!
//! - [`PreferenceStore`] is the JSON-backed store itself
//! - [`SessionMetadata`] is the "which level did we save in" view
//! - [`Settings`] is the options-menu view

mod session;
mod settings;
mod store;

pub use session::SessionMetadata;
pub use settings::{MAX_VOLUME_DB, MIN_VOLUME_DB, Settings, SettingsGroup};
pub use store::{PrefValue, PreferenceError, PreferenceStore};
