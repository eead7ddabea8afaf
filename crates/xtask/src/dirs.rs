//! Save and log directory lookup
//!
//! Mirrors the save system's own resolution: `SAVE_DATA_DIR` wins, otherwise
//! the platform data directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use save_runtime::SaveConfig;

/// Resolve the data directory, preferring an explicit override
pub fn data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir.unwrap_or_else(|| SaveConfig::from_env().data_dir)
}

/// Per-run log directories written by the demo live here
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// List all session directories in the log directory
///
/// Returns a vector of (session_id, path) tuples, sorted by modification time (newest first)
pub fn list_sessions(log_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !log_dir.exists() {
        return Ok(Vec::new());
    }

    let mut sessions: Vec<(String, PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {}", log_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir()
            && let Some(session_id) = path.file_name().and_then(|n| n.to_str())
        {
            let modified = entry.metadata()?.modified()?;
            sessions.push((session_id.to_string(), path.clone(), modified));
        }
    }

    sessions.sort_by(|a, b| b.2.cmp(&a.2));

    Ok(sessions
        .into_iter()
        .map(|(id, path, _)| (id, path))
        .collect())
}
