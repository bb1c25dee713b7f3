//! Process configuration
//!
//! One JSON file, every section optional:
//!
//! ```json
//! {
//!   "http": { "host": "0.0.0.0", "port": 8080, "body_limit": 1048576 },
//!   "storage": { "backend": "file", "path": "./data" },
//!   "logging": { "level": "info", "format": "json", "file": "./logs/citizens.log" },
//!   "import": { "allow_self_relative": false },
//!   "debug": false
//! }
//! ```
//!
//! Relative paths resolve against the directory holding the file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::observability::LogConfig;
use crate::service::ImportConfig;
use crate::storage::StorageConfig;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "./citizens.config.json";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON in `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Whole-process configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LogConfig,

    #[serde(default)]
    pub import: ImportConfig,

    /// Log request and response lines at debug level
    #[serde(default)]
    pub debug: bool,
}

/// A loaded configuration and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ServiceConfig,
    /// `None` when the file was missing and defaults were used
    pub source: Option<PathBuf>,
}

impl ServiceConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<LoadedConfig, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(LoadedConfig {
                    config: Self::default(),
                    source: None,
                })
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: ServiceConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }

        Ok(LoadedConfig {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// Makes relative file paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        self.storage.path = resolve(base, &self.storage.path);
        if let Some(file) = &self.logging.file {
            self.logging.file = Some(resolve(base, file));
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
