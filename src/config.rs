/// Application configuration
///
/// Read from `<config dir>/photo-wall/config.json` when present. Every field
/// has a default, so a partial (or missing) file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Overrides `data_dir` when set
pub const DATA_DIR_ENV: &str = "PHOTO_WALL_DATA_DIR";

const APP_DIR: &str = "photo-wall";
const DB_FILE: &str = "photo_wall.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the gallery database
    pub data_dir: PathBuf,
    /// Dark or light window theme
    pub dark_theme: bool,
    /// How long notifications stay up, in milliseconds
    pub notification_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let mut data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        data_dir.push(APP_DIR);

        Self {
            data_dir,
            dark_theme: true,
            notification_ms: 3000,
        }
    }
}

impl Config {
    /// Load the user's config file, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                debug!("no config file, using defaults");
                Self::default()
            }
        };

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }

        info!(data_dir = %config.data_dir.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Path of the SQLite file under the data directory
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}
