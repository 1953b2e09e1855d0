//! Settings document persistence
//!
//! A single JSON object `{ "requireAdminApproval": bool }`. A missing or
//! unreadable document means defaults; the unreadable case is logged.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Settings;

/// File-backed settings store
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults
    pub async fn load(&self) -> Settings {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Settings file absent, using defaults");
                return Settings::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to read settings, using defaults: {}", e);
                return Settings::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %self.path.display(), "Invalid settings document, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    /// Persist settings, creating the parent directory if needed
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| Error::corrupt_document("settings", e))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
