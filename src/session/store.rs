//! Persistence backends for the session document.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::models::SessionMap;

/// Whole-document persistence for conversations.
///
/// The document is read and written as a unit; `save` always writes every
/// session. Callers are responsible for serializing access (see
/// [`super::SessionCache`]).
pub trait SessionStore: Send + Sync {
    /// Reads the full mapping. A store with nothing persisted yet returns
    /// an empty mapping.
    fn load(&self) -> Result<SessionMap>;

    /// Replaces the persisted mapping.
    fn save(&self, sessions: &SessionMap) -> Result<()>;
}

/// Stores the session document as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "conversations.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<SessionMap> {
        if !self.path.exists() {
            return Ok(SessionMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(SessionMap::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn save(&self, sessions: &SessionMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(sessions)?;

        // Write beside the target and rename so readers never see a partial file
        let temp = self.temp_path();
        fs::write(&temp, json)
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
