//! The [`Stored`] accessor: one typed setting bound to one key.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use stored_backend::KeyValueStorage;
use tracing::{debug, error, warn};

use crate::codec::JsonCodec;
use crate::error::CodecResult;
use crate::standard::standard_storage;

/// A typed read/write handle for a single setting.
///
/// Binds a key, a default value, and a shared [`KeyValueStorage`]. Every
/// [`read`](Self::read) and [`write`](Self::write) goes straight to the
/// backend; nothing is cached. The accessor only ever touches its own key.
///
/// ```
/// use std::sync::Arc;
/// use stored::{InMemoryStorage, Stored};
///
/// let storage = Arc::new(InMemoryStorage::new());
/// let twelve_hours = Stored::new("useTwelveHoursFormat", false, storage);
///
/// assert!(!twelve_hours.read());
/// twelve_hours.set(&true);
/// assert!(twelve_hours.read());
/// twelve_hours.clear();
/// assert!(!twelve_hours.read());
/// ```
#[derive(Clone)]
pub struct Stored<T> {
    key: String,
    default_value: T,
    storage: Arc<dyn KeyValueStorage>,
}

impl<T> Stored<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Bind `key` and `default_value` to `storage`.
    pub fn new(
        key: impl Into<String>,
        default_value: T,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            key: key.into(),
            default_value,
            storage,
        }
    }

    /// Bind `key` and `default_value` to the process-wide standard storage.
    pub fn standard(key: impl Into<String>, default_value: T) -> Self {
        Self::new(key, default_value, standard_storage())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Current value, or the default when nothing is stored.
    ///
    /// Stored bytes that do not decode as `T` are treated as absent: the
    /// failure is logged and the default returned. Use
    /// [`try_read`](Self::try_read) to observe it instead.
    pub fn read(&self) -> T {
        match self.try_read() {
            Ok(Some(value)) => value,
            Ok(None) => self.default_value.clone(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored value undecodable, using default");
                self.default_value.clone()
            }
        }
    }

    /// Stored value without default fallback.
    ///
    /// `Ok(None)` when the key has no entry; `Err` when the entry does not
    /// decode as `T`.
    pub fn try_read(&self) -> CodecResult<Option<T>> {
        match self.storage.get(&self.key) {
            Some(bytes) => JsonCodec::decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Store `value`, or remove the key when `value` is `None`.
    ///
    /// A value whose JSON form is `null` also removes the key.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `value` cannot be encoded as JSON. That is
    /// a programming error in the setting's type. Release builds log the
    /// failure and leave the store unchanged.
    pub fn write(&self, value: Option<&T>) {
        if let Err(e) = self.try_write(value) {
            error!(key = %self.key, error = %e, "could not encode value, store unchanged");
            if cfg!(debug_assertions) {
                panic!("could not encode value for key {:?}: {e}", self.key);
            }
        }
    }

    /// Like [`write`](Self::write) but returns encode failures.
    pub fn try_write(&self, value: Option<&T>) -> CodecResult<()> {
        let Some(value) = value else {
            self.remove_entry();
            return Ok(());
        };

        let bytes = JsonCodec::encode(value)?;
        if JsonCodec::is_null(&bytes) {
            self.remove_entry();
        } else {
            self.storage.set(Some(&bytes), &self.key);
            debug!(key = %self.key, len = bytes.len(), "stored value");
        }
        Ok(())
    }

    /// Shorthand for `write(Some(value))`.
    pub fn set(&self, value: &T) {
        self.write(Some(value));
    }

    /// Remove the stored entry; later reads return the default.
    pub fn clear(&self) {
        self.write(None);
    }

    /// Whether the backend currently holds an entry for this key.
    pub fn is_set(&self) -> bool {
        self.storage.contains(&self.key)
    }

    fn remove_entry(&self) {
        self.storage.remove(&self.key);
        debug!(key = %self.key, "cleared value");
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Stored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stored")
            .field("key", &self.key)
            .field("default_value", &self.default_value)
            .finish_non_exhaustive()
    }
}
