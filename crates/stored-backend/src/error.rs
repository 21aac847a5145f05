use std::path::PathBuf;

/// Errors from opening, loading, or persisting a storage backend.
///
/// The [`KeyValueStorage`](crate::KeyValueStorage) methods themselves never
/// return these; they surface only from backend lifecycle operations such as
/// [`FileStorage::open`](crate::FileStorage::open) and
/// [`FileStorage::flush`](crate::FileStorage::flush).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings document could not be parsed.
    #[error("malformed settings document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    /// A stored entry is not valid hex.
    #[error("corrupt entry {key:?} in {path}: {reason}")]
    CorruptEntry {
        path: PathBuf,
        key: String,
        reason: String,
    },

    /// The settings document was written by an incompatible version.
    #[error("unsupported settings document version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Serialization of the settings document failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The configuration file could not be parsed.
    #[error("invalid storage config: {0}")]
    InvalidConfig(String),

    /// The platform does not expose a user configuration directory.
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Result alias for backend lifecycle operations.
pub type StoreResult<T> = Result<T, StoreError>;
