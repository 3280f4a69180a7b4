//! # Interchange Configuration
//!
//! Configuration management for import and export.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_DB_PATH=/srv/tally.db                                        │
//! │     TALLY_BATCH_SIZE=200                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tally/interchange.toml (Linux)                           │
//! │     ~/Library/Application Support/com.tally.tally/interchange.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     tally.db, batches of 50, 5 sample rows, 10 displayed errors        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # interchange.toml
//! [database]
//! path = "tally.db"
//! max_connections = 5
//!
//! [import]
//! batch_size = 50
//! validation_sample_rows = 5
//! error_display_limit = 10
//!
//! [export]
//! output_dir = "."
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use tally_core::{DEFAULT_BATCH_SIZE, DEFAULT_ERROR_DISPLAY_LIMIT, DEFAULT_VALIDATION_SAMPLE_ROWS};
use tally_db::DbConfig;

use crate::error::{InterchangeError, InterchangeResult};

// =============================================================================
// Database Settings
// =============================================================================

/// Where the database lives and how big its pool is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. Created on first use.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("tally.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    /// Pool configuration for these settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.path).max_connections(self.max_connections)
    }
}

// =============================================================================
// Import Settings
// =============================================================================

/// Import behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Rows committed per transaction by the progress-reporting import.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Data rows spot-checked by pre-flight validation.
    #[serde(default = "default_sample_rows")]
    pub validation_sample_rows: usize,

    /// Error messages shown to a user after an import.
    #[serde(default = "default_error_display_limit")]
    pub error_display_limit: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_sample_rows() -> usize {
    DEFAULT_VALIDATION_SAMPLE_ROWS
}
fn default_error_display_limit() -> usize {
    DEFAULT_ERROR_DISPLAY_LIMIT
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            batch_size: default_batch_size(),
            validation_sample_rows: default_sample_rows(),
            error_display_limit: default_error_display_limit(),
        }
    }
}

// =============================================================================
// Export Settings
// =============================================================================

/// Export behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory exports and templates are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            output_dir: default_output_dir(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete interchange configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterchangeConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub import: ImportSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl InterchangeConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`interchange.toml`); a missing file is not an error
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> InterchangeResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading interchange config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load interchange config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> InterchangeResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| InterchangeError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> InterchangeResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| InterchangeError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| InterchangeError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| InterchangeError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Interchange config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> InterchangeResult<()> {
        if self.import.batch_size == 0 {
            return Err(InterchangeError::InvalidConfig(
                "batch_size must be greater than 0".into(),
            ));
        }

        if self.import.validation_sample_rows == 0 {
            return Err(InterchangeError::InvalidConfig(
                "validation_sample_rows must be greater than 0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(InterchangeError::InvalidConfig(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(InterchangeError::InvalidConfig(
                "database path must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the environment in production).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TALLY_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        let numeric = |key: &str, target: &mut usize| {
            if let Some(raw) = lookup(key) {
                match raw.parse::<usize>() {
                    Ok(value) => {
                        debug!(key, value, "Overriding setting from environment");
                        *target = value;
                    }
                    Err(_) => warn!(key, value = %raw, "Ignoring non-numeric override"),
                }
            }
        };
        numeric("TALLY_BATCH_SIZE", &mut self.import.batch_size);
        numeric(
            "TALLY_VALIDATION_SAMPLE_ROWS",
            &mut self.import.validation_sample_rows,
        );
        numeric("TALLY_ERROR_DISPLAY_LIMIT", &mut self.import.error_display_limit);

        if let Some(dir) = lookup("TALLY_EXPORT_DIR") {
            debug!(dir = %dir, "Overriding export directory from environment");
            self.export.output_dir = PathBuf::from(dir);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|dirs| dirs.config_dir().join("interchange.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = InterchangeConfig::default();
        assert_eq!(config.import.batch_size, 50);
        assert_eq!(config.import.validation_sample_rows, 5);
        assert_eq!(config.import.error_display_limit, 10);
        assert_eq!(config.database.path, PathBuf::from("tally.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = InterchangeConfig::default();
        config.import.batch_size = 0;
        assert!(config.validate().is_err());

        config.import.batch_size = 10;
        config.import.validation_sample_rows = 0;
        assert!(config.validate().is_err());

        config.import.validation_sample_rows = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interchange.toml");
        std::fs::write(&path, "[import]\nbatch_size = 200\n").unwrap();

        let config = InterchangeConfig::from_file(&path).unwrap();
        assert_eq!(config.import.batch_size, 200);
        assert_eq!(config.import.error_display_limit, 10);
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interchange.toml");
        std::fs::write(&path, "[import\nbatch_size = ").unwrap();

        let err = InterchangeConfig::load(Some(path)).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TALLY_DB_PATH", "/srv/tally.db"),
            ("TALLY_BATCH_SIZE", "25"),
            ("TALLY_ERROR_DISPLAY_LIMIT", "not-a-number"),
            ("TALLY_EXPORT_DIR", "/tmp/exports"),
        ]
        .into_iter()
        .collect();

        let mut config = InterchangeConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/srv/tally.db"));
        assert_eq!(config.import.batch_size, 25);
        assert_eq!(config.import.error_display_limit, 10);
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("interchange.toml");

        let mut config = InterchangeConfig::default();
        config.import.batch_size = 75;
        config.save(Some(path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[import]"));
        assert_eq!(InterchangeConfig::from_file(&path).unwrap().import.batch_size, 75);
    }
}
