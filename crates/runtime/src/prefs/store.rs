//! Flat key-value preference store persisted as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing preferences.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference file I/O failed")]
    Io(#[from] io::Error),

    #[error("preference file {path} is not valid JSON")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize preferences")]
    Serialize(#[source] serde_json::Error),
}

/// One stored preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// String-keyed preferences, kept outside the capability protocol.
///
/// Setters only touch memory; [`PreferenceStore::flush`] writes everything
/// with the same temp-then-rename discipline as the save slot. A store built
/// with [`PreferenceStore::in_memory`] never touches disk.
#[derive(Debug, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, PrefValue>,
}

impl PreferenceStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| {
                PreferenceError::Malformed {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            values,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            PrefValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Reads a float; integer entries widen.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.values.get(key)? {
            PrefValue::Float(value) => Some(*value),
            PrefValue::Int(value) => Some(*value as f64),
            PrefValue::Text(_) => None,
        }
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            PrefValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Booleans are stored as `0`/`1` integers.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_int(key).map(|value| value != 0)
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.values.insert(key.into(), PrefValue::Int(value));
    }

    /// Stores a float. Non-finite values have no JSON form and are skipped,
    /// leaving any previous entry in place.
    pub fn set_float(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        if !value.is_finite() {
            tracing::warn!(target: "save::prefs", key = %key, value, "ignoring non-finite preference");
            return;
        }
        self.values.insert(key, PrefValue::Float(value));
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), PrefValue::Text(value.into()));
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set_int(key, i64::from(value));
    }

    pub fn remove(&mut self, key: &str) -> Option<PrefValue> {
        self.values.remove(key)
    }

    /// Writes all values to disk.
    pub fn flush(&self) -> Result<(), PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json =
            serde_json::to_vec_pretty(&self.values).map_err(PreferenceError::Serialize)?;

        let mut temp = path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, json)?;
        fs::rename(&temp, path)?;

        tracing::debug!(
            target: "save::prefs",
            path = %path.display(),
            keys = self.values.len(),
            "flushed preferences"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_opens_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = PreferenceStore::open(temp_dir.path().join("prefs.json")).unwrap();
        assert!(!store.has("anything"));
    }

    #[test]
    fn values_survive_flush_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");

        let mut store = PreferenceStore::open(&path).unwrap();
        store.set_text("saved_level", "Tunnel");
        store.set_float("volume.master", -12.5);
        store.set_bool("vsync", true);
        store.flush().unwrap();

        let reopened = PreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get_text("saved_level"), Some("Tunnel"));
        assert_eq!(reopened.get_float("volume.master"), Some(-12.5));
        assert_eq!(reopened.get_bool("vsync"), Some(true));
    }

    #[test]
    fn typed_getters_do_not_coerce_text() {
        let mut store = PreferenceStore::in_memory();
        store.set_text("quality", "high");
        store.set_int("sens", 4);

        assert_eq!(store.get_int("quality"), None);
        assert_eq!(store.get_float("sens"), Some(4.0));
        assert_eq!(store.get_text("sens"), None);
    }

    #[test]
    fn non_finite_floats_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");

        let mut store = PreferenceStore::open(&path).unwrap();
        store.set_float("graphics.brightness", 0.3);
        store.set_float("graphics.brightness", f64::NAN);
        store.set_float("gameplay.sensitivity", f64::INFINITY);
        store.flush().unwrap();

        let reopened = PreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get_float("graphics.brightness"), Some(0.3));
        assert!(!reopened.has("gameplay.sensitivity"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(
            PreferenceStore::open(&path),
            Err(PreferenceError::Malformed { .. })
        ));
    }
}
