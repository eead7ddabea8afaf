//! Repository contract for the single save slot.

use save_core::SaveFile;

use super::Result;

/// Storage for the one persisted [`SaveFile`].
///
/// Absence is not an error: [`load`](SaveRepository::load) returns `None`
/// when nothing has been saved yet. A successful [`save`](SaveRepository::save)
/// fully replaces the previous contents; implementations must never expose a
/// partially written file to a later `load`.
pub trait SaveRepository: Send + Sync {
    /// Load the saved file, if any.
    fn load(&self) -> Result<Option<SaveFile>>;

    /// Replace the saved file.
    fn save(&self, file: &SaveFile) -> Result<()>;

    /// Check if a save exists
    fn exists(&self) -> bool;

    /// Delete the save. Deleting a missing save is not an error.
    fn delete(&self) -> Result<()>;
}
