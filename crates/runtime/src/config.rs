//! Save system configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default save slot file name.
pub const SAVE_FILE_NAME: &str = "save.bin";
/// Default preference file name.
pub const PREFS_FILE_NAME: &str = "prefs.json";

/// Configuration for [`SaveSystem`](crate::SaveSystem) and its storage.
#[derive(Clone, Debug)]
pub struct SaveConfig {
    /// Directory holding the save slot and preferences.
    pub data_dir: PathBuf,
    pub save_file_name: String,
    pub prefs_file_name: String,
    /// How often `load_when_ready` re-checks the readiness gate.
    pub poll_interval: Duration,
    /// How long the UI should show the "game saved" notice.
    pub notice_duration: Duration,
    pub event_buffer_size: usize,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            save_file_name: SAVE_FILE_NAME.to_string(),
            prefs_file_name: PREFS_FILE_NAME.to_string(),
            poll_interval: Duration::from_millis(50),
            notice_duration: Duration::from_millis(2500),
            event_buffer_size: 16,
        }
    }
}

impl SaveConfig {
    /// Configuration rooted at `data_dir`, everything else default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SAVE_DATA_DIR` - Directory for save data (default: platform-specific)
    /// - `SAVE_POLL_MS` - Readiness poll interval in milliseconds (default: 50)
    /// - `SAVE_NOTICE_MS` - "Game saved" notice duration in milliseconds (default: 2500)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SAVE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(ms) = read_env::<u64>("SAVE_POLL_MS") {
            config.poll_interval = Duration::from_millis(ms.max(1));
        }

        if let Some(ms) = read_env::<u64>("SAVE_NOTICE_MS") {
            config.notice_duration = Duration::from_millis(ms);
        }

        config
    }

    pub fn save_path(&self) -> PathBuf {
        self.data_dir.join(&self.save_file_name)
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir.join(&self.prefs_file_name)
    }
}

/// Platform data directory for save files.
///
/// - macOS: `~/Library/Application Support/savegame`
/// - Linux: `~/.local/share/savegame` (or `$XDG_DATA_HOME/savegame`)
/// - Windows: `%APPDATA%\savegame\data`
/// - Fallback: `./save_data`
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "savegame")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_data_dir() {
        let config = SaveConfig::with_data_dir("/tmp/slot");

        assert_eq!(config.save_path(), PathBuf::from("/tmp/slot/save.bin"));
        assert_eq!(config.prefs_path(), PathBuf::from("/tmp/slot/prefs.json"));
        assert_eq!(config.notice_duration, Duration::from_millis(2500));
    }
}
