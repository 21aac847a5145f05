//! Key-value storage backends for typed stored settings.
//!
//! This crate defines the byte-level storage capability that the `stored`
//! accessors consume, analogous to a platform settings registry: string keys
//! mapping to opaque byte values, with get/set/remove by key.
//!
//! # Storage Backends
//!
//! All backends implement the [`KeyValueStorage`] trait:
//!
//! - [`InMemoryStorage`] -- `HashMap`-based store for tests and embedding
//! - [`FileStorage`] -- settings document persisted on disk (production)
//! - [`ScopedStorage`] -- named suite over another backend
//!
//! # Design Rules
//!
//! 1. Last write wins per key and is visible to later reads in-process.
//! 2. Setting `None` removes the key; no sentinel is stored.
//! 3. The store never interprets the bytes it holds.
//! 4. `get`/`set` never return errors; lifecycle operations (open, flush,
//!    reload) do.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod scoped;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{standard_path, StorageConfig, SyncMode};
pub use error::{StoreError, StoreResult};
pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use scoped::ScopedStorage;
pub use traits::KeyValueStorage;
