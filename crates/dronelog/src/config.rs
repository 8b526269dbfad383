//! Configuration management for dronelog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::log_store::DEFAULT_LOG_KEY;
use crate::record::Location;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "dronelog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "journal.db";

/// Default directory for imported photos, inside the data directory.
const PHOTOS_DIR_NAME: &str = "photos";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `DRONELOG_`, sections separated by
///    `__`, e.g. `DRONELOG_STORAGE__LOG_KEY`)
/// 2. TOML config file at `~/.config/dronelog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Camera configuration.
    pub camera: CameraConfig,
    /// Location configuration.
    pub location: LocationConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/dronelog/journal.db`
    pub database_path: Option<PathBuf>,
    /// Key the observation log is stored under.
    pub log_key: String,
}

/// Camera-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Whether photos may be attached.
    pub enabled: bool,
    /// Where imported photos are kept.
    /// Defaults to `~/.local/share/dronelog/photos`
    pub photos_dir: Option<PathBuf>,
}

/// Location-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Whether positions may be attached.
    pub enabled: bool,
    /// Latitude reported when the host has no positioning hardware.
    pub latitude: Option<f64>,
    /// Longitude reported when the host has no positioning hardware.
    pub longitude: Option<f64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            log_key: DEFAULT_LOG_KEY.to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            photos_dir: None,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: None,
            longitude: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("DRONELOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.log_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.log_key must not be empty".to_string(),
            });
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(latitude), Some(longitude)) => {
                if !Location::new(latitude, longitude).is_valid() {
                    return Err(Error::ConfigValidation {
                        message: format!(
                            "location ({latitude}, {longitude}) is out of range"
                        ),
                    });
                }
            }
            (None, None) => {}
            _ => {
                return Err(Error::ConfigValidation {
                    message: "location.latitude and location.longitude must be set together"
                        .to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the photos directory, resolving defaults if not set.
    #[must_use]
    pub fn photos_dir(&self) -> PathBuf {
        self.camera
            .photos_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(PHOTOS_DIR_NAME))
    }

    /// Get the configured position, if both coordinates are set.
    #[must_use]
    pub fn fixed_position(&self) -> Option<Location> {
        match (self.location.latitude, self.location.longitude) {
            (Some(latitude), Some(longitude)) => Some(Location::new(latitude, longitude)),
            _ => None,
        }
    }
}
