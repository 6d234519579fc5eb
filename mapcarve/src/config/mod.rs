//! Configuration file handling for ~/.mapcarve/config.ini.
//!
//! Loads user configuration with sensible defaults. Settings structs live
//! in [`settings`](self::settings), INI-to-struct mapping in the private
//! parser module. A missing file is not an error; every section and key is
//! optional and overlays [`CarveConfig::default`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod parser;
mod settings;

pub use settings::{
    AdmissionSettings, CarveConfig, ExecutorSettings, LoggingSettings, PathsSettings,
    DEFAULT_LOG_DIRECTORY, DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL,
};

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl CarveConfig {
    /// Load configuration from the default path (~/.mapcarve/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.mapcarve).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mapcarve")
}

/// Get the path to the config file (~/.mapcarve/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = CarveConfig::load_from(&config_path).unwrap();
        let default = CarveConfig::default();

        assert_eq!(config.admission.cost_ceiling, default.admission.cost_ceiling);
        assert_eq!(config.executor.queue_capacity, default.executor.queue_capacity);
        assert_eq!(config.paths.results_dir, default.paths.results_dir);
    }

    #[test]
    fn test_config_file_path_is_under_home() {
        let path = config_file_path();
        assert!(path.ends_with(".mapcarve/config.ini"));
    }
}
