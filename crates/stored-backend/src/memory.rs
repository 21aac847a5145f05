use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::traits::KeyValueStorage;

/// In-memory, HashMap-based key-value storage.
///
/// Intended for tests and embedding. Entries are held behind a `RwLock` for
/// safe concurrent access and are lost when the store is dropped. Bytes are
/// cloned on read and write.
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> Vec<String> {
        let map = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn set(&self, value: Option<&[u8]>, key: &str) {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match value {
            Some(bytes) => {
                map.insert(key.to_string(), bytes.to_vec());
            }
            None => {
                map.remove(key);
            }
        }
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let map = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        let map = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        map.contains_key(key)
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("key_count", &self.len())
            .finish()
    }
}
