use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persisted user preferences. One value today: the chosen input device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub input_device: Option<String>,
}

/// JSON-file preference store
///
/// Read once at startup, written on every user-driven device change.
/// A missing or unreadable file yields defaults rather than an error.
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store location under the user's config directory.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("No user config directory available")?;
        Ok(dir.join("livescribe").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Preferences {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Preferences::default(),
        };

        match serde_json::from_slice(&bytes) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(
                    "Ignoring unreadable preference file {}: {}",
                    self.path.display(),
                    e
                );
                Preferences::default()
            }
        }
    }

    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(prefs)?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }
}
