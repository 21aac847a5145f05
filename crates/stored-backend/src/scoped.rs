//! Named suites over a shared backend.
//!
//! A [`ScopedStorage`] partitions one backend into independent namespaces by
//! prefixing every key with `"{suite}."`. Two suites over the same backend
//! never see each other's keys.

use std::sync::Arc;

use crate::traits::KeyValueStorage;

/// Separator between the suite name and the key.
pub const SUITE_SEPARATOR: char = '.';

/// A key-prefixed view of another [`KeyValueStorage`].
#[derive(Clone)]
pub struct ScopedStorage {
    suite: String,
    inner: Arc<dyn KeyValueStorage>,
}

impl ScopedStorage {
    /// Create a view of `inner` restricted to `suite`.
    pub fn new(suite: impl Into<String>, inner: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            suite: suite.into(),
            inner,
        }
    }

    /// The suite name.
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// The key under which `key` is stored in the underlying backend.
    pub fn scoped_key(&self, key: &str) -> String {
        format!("{}{}{}", self.suite, SUITE_SEPARATOR, key)
    }
}

impl KeyValueStorage for ScopedStorage {
    fn set(&self, value: Option<&[u8]>, key: &str) {
        self.inner.set(value, &self.scoped_key(key));
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(&self.scoped_key(key))
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(&self.scoped_key(key))
    }
}

impl std::fmt::Debug for ScopedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedStorage")
            .field("suite", &self.suite)
            .finish_non_exhaustive()
    }
}
