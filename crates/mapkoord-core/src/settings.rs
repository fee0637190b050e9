//! Persisted user settings.
//!
//! A small JSON record holding the last tool path the user picked. Loading
//! never fails: a missing or corrupt file degrades to the empty default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppError;

/// File name of the settings record inside the settings directory.
const SETTINGS_FILE: &str = "settings.json";

/// User settings persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Last-known path to `CodeWalker.exe`.
    pub codewalker_path: Option<PathBuf>,
}

impl UserSettings {
    /// Load settings from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No readable settings file, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Settings file is corrupt, using defaults");
                Self::default()
            }
        }
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::with_source(
                    crate::error::ErrorKind::Io,
                    format!("Cannot create settings directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Settings saved");
        Ok(())
    }
}

/// Default settings location: `<config dir>/mapkoord/settings.json`.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mapkoord")
        .join(SETTINGS_FILE)
}
