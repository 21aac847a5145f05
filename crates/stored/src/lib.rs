//! Typed settings persisted as JSON in a pluggable key-value store.
//!
//! A [`Stored<T>`] binds a string key, a default value, and a shared
//! [`KeyValueStorage`] into a read/write handle for one setting. Values are
//! encoded with [`JsonCodec`]; reading a key that was never written (or
//! whose bytes no longer decode) yields the default.
//!
//! Settings are usually grouped as fields of a plain struct:
//!
//! ```
//! use std::sync::Arc;
//! use stored::{InMemoryStorage, KeyValueStorage, Stored};
//!
//! struct AppSettings {
//!     token: Stored<Option<String>>,
//!     use_twelve_hours_format: Stored<bool>,
//! }
//!
//! impl AppSettings {
//!     fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
//!         Self {
//!             token: Stored::new("token", None, storage.clone()),
//!             use_twelve_hours_format: Stored::new("useTwelveHoursFormat", false, storage),
//!         }
//!     }
//! }
//!
//! let settings = AppSettings::new(Arc::new(InMemoryStorage::new()));
//! settings.token.set(&Some("abc123".into()));
//! assert_eq!(settings.token.read().as_deref(), Some("abc123"));
//! assert!(!settings.use_twelve_hours_format.read());
//! ```
//!
//! # Modules
//!
//! - [`accessor`] — the [`Stored`] accessor
//! - [`codec`] — JSON encoding of stored values
//! - [`error`] — [`CodecError`]
//! - [`standard`] — the process-wide file-backed storage

pub mod accessor;
pub mod codec;
pub mod error;
pub mod standard;

pub use accessor::Stored;
pub use codec::JsonCodec;
pub use error::{CodecError, CodecResult};
pub use standard::{install_standard_storage, standard_storage};

// Backends, re-exported so most users need only this crate.
pub use stored_backend::{
    FileStorage, InMemoryStorage, KeyValueStorage, ScopedStorage, StorageConfig, StoreError,
    SyncMode,
};
