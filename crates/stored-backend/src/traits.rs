use std::sync::Arc;

/// Byte-oriented key-value storage capability.
///
/// This is the only interface typed accessors consume. All implementations
/// must satisfy these invariants:
/// - Last write wins per key, and is visible to subsequent reads in the same
///   process.
/// - `set(None, key)` removes the key entirely; a later `get` returns `None`.
/// - Operations on one key never alter any other key.
/// - The store never interprets the bytes it holds.
/// - `get` and `set` never fail through an error channel. Backends that can
///   hit I/O failures absorb and log them.
pub trait KeyValueStorage: Send + Sync {
    /// Store `value` under `key`, or remove `key` when `value` is `None`.
    fn set(&self, value: Option<&[u8]>, key: &str);

    /// Return the bytes stored under `key`, or `None` if never set or removed.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Remove `key`. Equivalent to `set(None, key)`.
    fn remove(&self, key: &str) {
        self.set(None, key);
    }

    /// Whether an entry currently exists for `key`.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn set(&self, value: Option<&[u8]>, key: &str) {
        (**self).set(value, key)
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn set(&self, value: Option<&[u8]>, key: &str) {
        (**self).set(value, key)
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }
}
