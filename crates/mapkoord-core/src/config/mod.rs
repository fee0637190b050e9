//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! via the `config` crate, overlaid with environment variables prefixed
//! with `MAPKOORD_` (nested keys separated by `__`, e.g.
//! `MAPKOORD_EXPORT__ATTEMPT_TIMEOUT_SECONDS=120`).

pub mod export;
pub mod extract;
pub mod logging;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::export::ExportConfig;
use self::extract::ExtractConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "MAPKOORD";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External tool invocation settings.
    pub export: ExportConfig,
    /// Coordinate extraction settings.
    pub extract: ExtractConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Location of the persisted user settings file.
    ///
    /// `None` uses [`crate::settings::default_settings_path`].
    pub settings_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges of all sections.
    pub fn validate(&self) -> Result<(), AppError> {
        Validate::validate(&self.export)
            .map_err(|e| AppError::validation(format!("Invalid [export] section: {e}")))?;
        Validate::validate(&self.extract)
            .map_err(|e| AppError::validation(format!("Invalid [extract] section: {e}")))?;
        Ok(())
    }

    /// Resolve the effective settings file path.
    pub fn effective_settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(crate::settings::default_settings_path)
    }
}
