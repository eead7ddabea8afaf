//! In-memory SaveRepository implementation for tests and headless runs.

use std::sync::RwLock;

use save_core::SaveFile;

use crate::codec;
use crate::repository::{RepositoryError, Result, SaveRepository};

/// In-memory implementation of SaveRepository.
///
/// Stores the encoded frame rather than the map itself, so loads exercise
/// the same decode path as the file repository.
#[derive(Default)]
pub struct InMemorySaveRepo {
    bytes: RwLock<Option<Vec<u8>>>,
}

impl InMemorySaveRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with raw bytes already in the slot.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: RwLock::new(Some(bytes)),
        }
    }

    /// Copy of the stored frame, if any.
    pub fn bytes(&self) -> Result<Option<Vec<u8>>> {
        let bytes = self
            .bytes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(bytes.clone())
    }
}

impl SaveRepository for InMemorySaveRepo {
    fn load(&self) -> Result<Option<SaveFile>> {
        let bytes = self
            .bytes
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        match bytes.as_deref() {
            Some(bytes) => Ok(Some(codec::decode(bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, file: &SaveFile) -> Result<()> {
        let encoded = codec::encode(file)?;
        let mut bytes = self
            .bytes
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *bytes = Some(encoded);
        Ok(())
    }

    fn exists(&self) -> bool {
        self.bytes
            .read()
            .map(|bytes| bytes.is_some())
            .unwrap_or(false)
    }

    fn delete(&self) -> Result<()> {
        let mut bytes = self
            .bytes
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *bytes = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_repo_has_no_save() {
        let repo = InMemorySaveRepo::new();
        assert!(!repo.exists());
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_garbage_bytes_are_corruption() {
        let repo = InMemorySaveRepo::with_bytes(b"GSAV-not-a-frame".to_vec());
        assert!(repo.load().unwrap_err().is_corruption());
    }

    #[test]
    fn test_save_load_delete() {
        let repo = InMemorySaveRepo::new();
        repo.save(&SaveFile::new()).unwrap();
        assert_eq!(repo.load().unwrap(), Some(SaveFile::new()));

        repo.delete().unwrap();
        assert!(!repo.exists());
    }
}
