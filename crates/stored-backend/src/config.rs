use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Directory created under the platform configuration directory.
pub const APP_DIR: &str = "stored";

/// File name of the standard settings document.
pub const DEFAULT_FILE_NAME: &str = "defaults.json";

/// Location of the standard settings document, e.g.
/// `~/.config/stored/defaults.json` on Linux.
///
/// Returns `None` when the platform has no user configuration directory.
pub fn standard_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(DEFAULT_FILE_NAME))
}

/// When the file backend writes its document to disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Persist and `fsync` after every write (safest, highest latency).
    #[default]
    EveryWrite,
    /// Persist after every write but rely on OS page-cache buffering.
    OsDefault,
    /// Persist only on explicit `flush()` or when the store is dropped.
    Manual,
}

/// Configuration for [`FileStorage`](crate::FileStorage).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the settings document.
    pub path: PathBuf,
    /// Flush/sync strategy.
    pub sync_mode: SyncMode,
    /// Pretty-print the document (easier to inspect by hand).
    pub pretty: bool,
}

impl StorageConfig {
    /// Config for a document at `path` with default settings otherwise.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Builder-style override of the sync mode.
    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    /// Parse a config from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: standard_path().unwrap_or_else(|| PathBuf::from(DEFAULT_FILE_NAME)),
            sync_mode: SyncMode::default(),
            pretty: true,
        }
    }
}
