//! File-backed settings storage.
//!
//! [`FileStorage`] keeps every entry in memory and mirrors the whole map to a
//! single JSON document on disk:
//!
//! ```text
//! {
//!   "version": 1,
//!   "entries": {
//!     "token": "2261626331323322",
//!     "useTwelveHoursFormat": "74727565"
//!   }
//! }
//! ```
//!
//! Values are opaque bytes, hex-encoded. The document is replaced atomically
//! (write to a temp file in the same directory, then rename) so a crash never
//! leaves a half-written document behind.
//!
//! Each persist re-reads the document and applies only the keys this
//! instance changed, so keys written through another handle on the same path
//! are kept.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{standard_path, StorageConfig, SyncMode};
use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStorage;

/// Current on-disk document version.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SettingsDocument {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

struct State {
    entries: HashMap<String, Vec<u8>>,
    /// Changes not yet written to disk; `None` marks a removal.
    pending: HashMap<String, Option<Vec<u8>>>,
}

/// Settings registry persisted as a JSON document.
///
/// This is the production [`KeyValueStorage`]. Reads are served from memory;
/// writes update memory and then persist according to the configured
/// [`SyncMode`]. A persistence failure during `set` is logged and the change
/// stays pending until the next successful write or [`flush`](Self::flush).
pub struct FileStorage {
    config: StorageConfig,
    state: RwLock<State>,
}

impl FileStorage {
    /// Open (or create) the settings document described by `config`.
    ///
    /// A missing file yields an empty store; the file is created on first
    /// write. A document that cannot be parsed is an error.
    pub fn open(config: StorageConfig) -> StoreResult<Self> {
        let entries = load_entries(&config.path)?;
        debug!(path = %config.path.display(), keys = entries.len(), "opened settings document");
        Ok(Self {
            config,
            state: RwLock::new(State {
                entries,
                pending: HashMap::new(),
            }),
        })
    }

    /// Open the standard settings document in the user's configuration
    /// directory.
    pub fn standard() -> StoreResult<Self> {
        let path = standard_path().ok_or(StoreError::NoConfigDir)?;
        Self::open(StorageConfig::at(path))
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.read_state().entries.len()
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of all keys.
    pub fn keys(&self) -> Vec<String> {
        let state = self.read_state();
        let mut keys: Vec<String> = state.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Whether there are changes not yet written to disk.
    pub fn has_pending_changes(&self) -> bool {
        !self.read_state().pending.is_empty()
    }

    /// Write pending changes to disk. No-op when nothing changed.
    pub fn flush(&self) -> StoreResult<()> {
        let mut state = self.write_state();
        if state.pending.is_empty() {
            return Ok(());
        }
        self.persist(&mut state)

    }

    /// Discard the in-memory view and re-read the document from disk.
    ///
    /// Pending changes that were never flushed are lost.
    pub fn reload(&self) -> StoreResult<()> {
        let entries = load_entries(&self.config.path)?;
        let mut state = self.write_state();
        if !state.pending.is_empty() {
            warn!(
                path = %self.config.path.display(),
                discarded = state.pending.len(),
                "reload discarded unflushed settings"
            );
        }
        state.entries = entries;
        state.pending.clear();
        Ok(())
    }

    /// Merge pending changes into the document on disk and adopt the result
    /// as the in-memory view. On error nothing changes.
    fn persist(&self, state: &mut State) -> StoreResult<()> {
        let path = &self.config.path;
        let mut entries = load_entries(path)?;
        for (key, change) in &state.pending {
            match change {
                Some(bytes) => {
                    entries.insert(key.clone(), bytes.clone());
                }
                None => {
                    entries.remove(key);
                }
            }
        }

        let doc = SettingsDocument {
            version: DOCUMENT_VERSION,
            entries: entries
                .iter()
                .map(|(k, v)| (k.clone(), hex::encode(v)))
                .collect(),
        };
        let content = if self.config.pretty {
            serde_json::to_vec_pretty(&doc)
        } else {
            serde_json::to_vec(&doc)
        }
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&content)?;
        if self.config.sync_mode == SyncMode::EveryWrite {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(path).map_err(|e| e.error)?;

        debug!(
            path = %path.display(),
            keys = entries.len(),
            changed = state.pending.len(),
            "persisted settings document"
        );
        state.entries = entries;
        state.pending.clear();
        Ok(())
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStorage for FileStorage {
    fn set(&self, value: Option<&[u8]>, key: &str) {
        let mut state = self.write_state();
        match value {
            Some(bytes) => {
                state.entries.insert(key.to_string(), bytes.to_vec());
                state.pending.insert(key.to_string(), Some(bytes.to_vec()));
            }
            None => {
                if state.entries.remove(key).is_none() {
                    return;
                }
                state.pending.insert(key.to_string(), None);
            }
        }

        if self.config.sync_mode == SyncMode::Manual {
            return;
        }
        if let Err(e) = self.persist(&mut state) {
            warn!(
                key = key,
                path = %self.config.path.display(),
                error = %e,
                "failed to persist settings; change kept in memory"
            );
        }
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.read_state().entries.get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.read_state().entries.contains_key(key)
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(path = %self.config.path.display(), error = %e, "failed to flush settings on drop");
        }
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.config.path)
            .field("sync_mode", &self.config.sync_mode)
            .field("key_count", &self.len())
            .finish()
    }
}

fn load_entries(path: &Path) -> StoreResult<HashMap<String, Vec<u8>>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(StoreError::Io(e)),
    };

    let doc: SettingsDocument =
        serde_json::from_str(&content).map_err(|e| StoreError::MalformedDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if doc.version != DOCUMENT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: doc.version,
            expected: DOCUMENT_VERSION,
        });
    }

    doc.entries
        .into_iter()
        .map(|(key, encoded)| match hex::decode(&encoded) {
            Ok(bytes) => Ok((key, bytes)),
            Err(e) => Err(StoreError::CorruptEntry {
                path: path.to_path_buf(),
                key,
                reason: e.to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(mode: SyncMode) -> (tempfile::TempDir, StorageConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::at(dir.path().join("defaults.json")).with_sync_mode(mode);
        (dir, config)
    }

    #[test]
    fn missing_file_opens_empty() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        let store = FileStorage::open(config.clone()).unwrap();
        assert!(store.is_empty());
        assert!(!config.path.exists());
    }

    #[test]
    fn set_get_remove() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        let store = FileStorage::open(config).unwrap();

        store.set(Some(b"\"abc123\""), "token");
        assert_eq!(store.get("token"), Some(b"\"abc123\"".to_vec()));
        assert!(store.contains("token"));

        store.remove("token");
        assert!(store.get("token").is_none());
        assert!(!store.contains("token"));
    }

    #[test]
    fn values_survive_reopen() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        {
            let store = FileStorage::open(config.clone()).unwrap();
            store.set(Some(b"true"), "useTwelveHoursFormat");
            store.set(Some(&[0u8, 255, 7]), "raw");
            assert!(!store.has_pending_changes());
        }
        let reopened = FileStorage::open(config).unwrap();
        assert_eq!(reopened.get("useTwelveHoursFormat"), Some(b"true".to_vec()));
        assert_eq!(reopened.get("raw"), Some(vec![0u8, 255, 7]));
        assert_eq!(reopened.keys(), vec!["raw", "useTwelveHoursFormat"]);
    }

    #[test]
    fn removal_is_persisted() {
        let (_dir, config) = temp_config(SyncMode::OsDefault);
        let store = FileStorage::open(config.clone()).unwrap();
        store.set(Some(b"1"), "a");
        store.set(Some(b"2"), "b");
        store.set(None, "a");
        drop(store);

        let reopened = FileStorage::open(config).unwrap();
        assert!(reopened.get("a").is_none());
        assert_eq!(reopened.get("b"), Some(b"2".to_vec()));
    }

    #[test]
    fn removing_absent_key_does_not_dirty() {
        let (_dir, config) = temp_config(SyncMode::Manual);
        let store = FileStorage::open(config).unwrap();
        store.remove("ghost");
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn manual_mode_defers_until_flush() {
        let (_dir, config) = temp_config(SyncMode::Manual);
        let store = FileStorage::open(config.clone()).unwrap();
        store.set(Some(b"42"), "answer");
        assert!(store.has_pending_changes());
        assert!(!config.path.exists());

        store.flush().unwrap();
        assert!(!store.has_pending_changes());
        assert!(config.path.exists());

        let other = FileStorage::open(config).unwrap();
        assert_eq!(other.get("answer"), Some(b"42".to_vec()));
    }

    #[test]
    fn manual_mode_flushes_on_drop() {
        let (_dir, config) = temp_config(SyncMode::Manual);
        {
            let store = FileStorage::open(config.clone()).unwrap();
            store.set(Some(b"x"), "k");
        }
        let reopened = FileStorage::open(config).unwrap();
        assert_eq!(reopened.get("k"), Some(b"x".to_vec()));
    }

    #[test]
    fn flush_without_changes_is_noop() {
        let (_dir, config) = temp_config(SyncMode::Manual);
        let store = FileStorage::open(config.clone()).unwrap();
        store.flush().unwrap();
        assert!(!config.path.exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("defaults.json");
        let store = FileStorage::open(StorageConfig::at(&path)).unwrap();
        store.set(Some(b"1"), "k");
        assert!(path.exists());
    }

    #[test]
    fn document_layout_is_versioned_hex() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        let store = FileStorage::open(config.clone()).unwrap();
        store.set(Some(b"true"), "flag");

        let raw = fs::read_to_string(&config.path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], DOCUMENT_VERSION);
        assert_eq!(value["entries"]["flag"], hex::encode(b"true"));
    }

    #[test]
    fn compact_document_when_not_pretty() {
        let (_dir, mut config) = temp_config(SyncMode::EveryWrite);
        config.pretty = false;
        let store = FileStorage::open(config.clone()).unwrap();
        store.set(Some(b"1"), "k");
        let raw = fs::read_to_string(&config.path).unwrap();
        assert!(!raw.contains('\n'));
    }

    #[test]
    fn malformed_document_is_rejected() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        fs::write(&config.path, "{ not json").unwrap();
        let err = FileStorage::open(config).unwrap_err();
        assert!(matches!(err, StoreError::MalformedDocument { .. }));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        fs::write(&config.path, r#"{"version":99,"entries":{}}"#).unwrap();
        let err = FileStorage::open(config).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion { found: 99, expected: DOCUMENT_VERSION }
        ));
    }

    #[test]
    fn corrupt_hex_entry_is_rejected() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        fs::write(&config.path, r#"{"version":1,"entries":{"k":"zz"}}"#).unwrap();
        let err = FileStorage::open(config).unwrap_err();
        match err {
            StoreError::CorruptEntry { key, .. } => assert_eq!(key, "k"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reload_picks_up_external_changes() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        let a = FileStorage::open(config.clone()).unwrap();
        let b = FileStorage::open(config).unwrap();

        a.set(Some(b"from-a"), "shared");
        assert!(b.get("shared").is_none());

        b.reload().unwrap();
        assert_eq!(b.get("shared"), Some(b"from-a".to_vec()));
    }

    #[test]
    fn persist_failure_keeps_change_in_memory() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        let store = FileStorage::open(config.clone()).unwrap();

        // A directory where the document should be makes every persist fail.
        fs::create_dir(&config.path).unwrap();
        store.set(Some(b"v"), "k");
        assert_eq!(store.get("k"), Some(b"v".to_vec()));
        assert!(store.has_pending_changes());
        assert!(store.flush().is_err());
        assert!(store.has_pending_changes());

        fs::remove_dir(&config.path).unwrap();
        store.flush().unwrap();
        assert!(!store.has_pending_changes());

        let reopened = FileStorage::open(config).unwrap();
        assert_eq!(reopened.get("k"), Some(b"v".to_vec()));
    }

    #[test]
    fn writers_on_same_path_keep_each_others_keys() {
        let (_dir, config) = temp_config(SyncMode::EveryWrite);
        let a = FileStorage::open(config.clone()).unwrap();
        let b = FileStorage::open(config.clone()).unwrap();

        a.set(Some(b"true"), "useTwelveHoursFormat");
        b.set(Some(b"\"abc123\""), "token");

        let reopened = FileStorage::open(config).unwrap();
        assert_eq!(reopened.get("useTwelveHoursFormat"), Some(b"true".to_vec()));
        assert_eq!(reopened.get("token"), Some(b"\"abc123\"".to_vec()));
        // The later writer also picked up the earlier key.
        assert_eq!(b.get("useTwelveHoursFormat"), Some(b"true".to_vec()));
    }

    #[test]
    fn removal_does_not_touch_keys_from_other_writers() {
        let (_dir, config) = temp_config(SyncMode::OsDefault);
        let a = FileStorage::open(config.clone()).unwrap();
        let b = FileStorage::open(config.clone()).unwrap();

        a.set(Some(b"1"), "k1");
        b.set(Some(b"2"), "k2");
        a.remove("k1");

        let reopened = FileStorage::open(config).unwrap();
        assert!(reopened.get("k1").is_none());
        assert_eq!(reopened.get("k2"), Some(b"2".to_vec()));
    }

    #[test]
    fn manual_flush_merges_with_document() {
        let (_dir, config) = temp_config(SyncMode::Manual);
        let a = FileStorage::open(config.clone()).unwrap();
        let b = FileStorage::open(config.clone()).unwrap();

        a.set(Some(b"1"), "k1");
        b.set(Some(b"2"), "k2");
        a.flush().unwrap();
        b.flush().unwrap();

        let reopened = FileStorage::open(config).unwrap();
        assert_eq!(reopened.keys(), vec!["k1", "k2"]);
    }

    #[test]
    fn debug_shows_path_and_count() {
        let (_dir, config) = temp_config(SyncMode::Manual);
        let store = FileStorage::open(config).unwrap();
        store.set(Some(b"1"), "a");
        let dbg = format!("{store:?}");
        assert!(dbg.contains("defaults.json"));
        assert!(dbg.contains("key_count: 1"));
    }
}
