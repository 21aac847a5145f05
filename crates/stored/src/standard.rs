use std::sync::{Arc, OnceLock};

use stored_backend::{FileStorage, InMemoryStorage, KeyValueStorage, StoreResult};
use tracing::warn;

static STANDARD: OnceLock<Arc<dyn KeyValueStorage>> = OnceLock::new();

/// The process-wide standard storage.
///
/// Unless [`install_standard_storage`] ran first, this is opened lazily on
/// first use from the settings document in the user's configuration
/// directory (see [`stored_backend::standard_path`]). If that document cannot
/// be opened, settings fall back to an in-memory store for the rest of the
/// process so reads and writes keep working.
pub fn standard_storage() -> Arc<dyn KeyValueStorage> {
    STANDARD
        .get_or_init(|| with_fallback(FileStorage::standard()))
        .clone()
}

/// Use `storage` as the standard storage for this process.
///
/// Must run before the first call to [`standard_storage`]. Returns `false`
/// (and leaves the existing storage in place) if the standard storage was
/// already initialized.
pub fn install_standard_storage(storage: Arc<dyn KeyValueStorage>) -> bool {
    STANDARD.set(storage).is_ok()
}

fn with_fallback(opened: StoreResult<FileStorage>) -> Arc<dyn KeyValueStorage> {
    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "standard settings unavailable, using in-memory storage");
            Arc::new(InMemoryStorage::new())
        }
    }
}
