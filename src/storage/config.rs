//! Storage backend configuration

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::StorageResult;
use super::file::FileStore;
use super::memory::MemoryStore;
use super::store::CitizenStore;

/// Which backend holds the imports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    File,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind (default: memory)
    #[serde(default)]
    pub backend: BackendKind,

    /// Root directory for the file backend (default: "./data")
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: default_path(),
        }
    }
}

impl StorageConfig {
    /// File backend rooted at `path`
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::File,
            path: path.into(),
        }
    }

    /// Opens the configured backend.
    pub fn open(&self) -> StorageResult<Arc<dyn CitizenStore>> {
        Ok(match self.backend {
            BackendKind::Memory => Arc::new(MemoryStore::new()),
            BackendKind::File => Arc::new(FileStore::open(&self.path)?),
        })
    }
}
