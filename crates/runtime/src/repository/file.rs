//! File-based SaveRepository implementation.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use save_core::SaveFile;

use crate::codec;
use crate::repository::{RepositoryError, Result, SaveRepository};

/// File-based implementation of SaveRepository.
///
/// # File Format
///
/// One codec frame (see [`crate::codec`]) stored at `{base_dir}/{file_name}`.
///
/// # Write Protocol
///
/// 1. Encode the whole save file in memory
/// 2. Write it to `{file_name}.tmp` and fsync
/// 3. Rename the temp file over the live file
///
/// A crash before step 3 leaves the previous save untouched; the stale temp
/// file is ignored by `load` and overwritten by the next `save`.
pub struct FileSaveRepository {
    path: PathBuf,
    temp_path: PathBuf,
}

impl FileSaveRepository {
    /// Create a repository for `{base_dir}/{file_name}`.
    pub fn new(base_dir: impl AsRef<Path>, file_name: &str) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir).map_err(RepositoryError::Io)?;

        let path = base_dir.join(file_name);
        let temp_path = base_dir.join(format!("{file_name}.tmp"));
        Ok(Self { path, temp_path })
    }

    /// Path of the live save file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path used for in-flight writes.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    fn write_temp(&self, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(&self.temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

impl SaveRepository for FileSaveRepository {
    fn load(&self) -> Result<Option<SaveFile>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::Io(e)),
        };

        if self.temp_path.exists() {
            tracing::warn!(
                "Ignoring stale temp file from an interrupted save: {}",
                self.temp_path.display()
            );
        }

        let file = codec::decode(&bytes)?;

        tracing::debug!(
            "Loaded save with {} entities from {}",
            file.len(),
            self.path.display()
        );

        Ok(Some(file))
    }

    fn save(&self, file: &SaveFile) -> Result<()> {
        let bytes = codec::encode(file)?;

        if let Err(e) = self.write_temp(&bytes) {
            // The live file is still intact; drop the partial temp.
            let _ = fs::remove_file(&self.temp_path);
            return Err(RepositoryError::Io(e));
        }

        // Atomic rename
        fs::rename(&self.temp_path, &self.path).map_err(RepositoryError::Io)?;

        tracing::debug!(
            "Saved {} entities ({} bytes) to {}",
            file.len(),
            bytes.len(),
            self.path.display()
        );

        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(RepositoryError::Io)?;
            tracing::info!("Deleted save: {}", self.path.display());
        }
        if self.temp_path.exists() {
            fs::remove_file(&self.temp_path).map_err(RepositoryError::Io)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use save_core::{EntityBundle, Identity, StateCapsule};
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileSaveRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileSaveRepository::new(temp_dir.path(), "save.bin").unwrap();
        (temp_dir, repo)
    }

    fn save_with(hp: f32) -> SaveFile {
        let mut bundle = EntityBundle::new();
        bundle.insert("health", StateCapsule::builder().field("hp", hp).build());
        [(Identity::new("player").unwrap(), bundle)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let (_temp, repo) = setup();

        assert!(!repo.exists());
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let (_temp, repo) = setup();

        repo.save(&save_with(40.0)).unwrap();

        assert!(repo.exists());
        assert!(!repo.temp_path().exists());
        assert_eq!(repo.load().unwrap(), Some(save_with(40.0)));
    }

    #[test]
    fn test_save_replaces_whole_file() {
        let (_temp, repo) = setup();

        repo.save(&save_with(40.0)).unwrap();
        repo.save(&SaveFile::new()).unwrap();

        assert_eq!(repo.load().unwrap(), Some(SaveFile::new()));
    }

    #[test]
    fn test_interrupted_write_keeps_previous_save() {
        let (_temp, repo) = setup();
        repo.save(&save_with(40.0)).unwrap();

        // Simulate a crash after half of the next frame reached the temp file.
        let next = codec::encode(&save_with(5.0)).unwrap();
        fs::write(repo.temp_path(), &next[..next.len() / 2]).unwrap();

        assert_eq!(repo.load().unwrap(), Some(save_with(40.0)));

        repo.save(&save_with(5.0)).unwrap();
        assert_eq!(repo.load().unwrap(), Some(save_with(5.0)));
    }

    #[test]
    fn test_truncated_live_file_is_corruption() {
        let (_temp, repo) = setup();
        repo.save(&save_with(40.0)).unwrap();

        let bytes = fs::read(repo.path()).unwrap();
        fs::write(repo.path(), &bytes[..bytes.len() - 3]).unwrap();

        let err = repo.load().unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_delete() {
        let (_temp, repo) = setup();
        repo.save(&save_with(40.0)).unwrap();

        repo.delete().unwrap();
        repo.delete().unwrap();

        assert!(repo.load().unwrap().is_none());
    }
}
