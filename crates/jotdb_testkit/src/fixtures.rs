//! Store fixtures with automatic cleanup.

use jotdb_core::{Store, StoreConfig};
use std::path::Path;
use tempfile::TempDir;

/// A store rooted in a temporary directory that is removed on drop.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates a store in a fresh temporary directory.
    pub fn new() -> Self {
        Self::with_config_fn(|config| config)
    }

    /// Creates a store after applying `adjust` to the default configuration.
    pub fn with_config_fn(adjust: impl FnOnce(StoreConfig) -> StoreConfig) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let config = adjust(StoreConfig::new(temp_dir.path().join("db")));
        let store = Store::open(config).expect("failed to open store");

        Self {
            store,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the store's base directory.
    pub fn base_dir(&self) -> &Path {
        self.store.base_dir()
    }

    /// Returns the temp directory that contains the base directory.
    pub fn scratch_dir(&self) -> &Path {
        self._temp_dir.path()
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary store.
///
/// # Example
///
/// ```rust,ignore
/// use jotdb_testkit::with_temp_store;
///
/// #[test]
/// fn my_test() {
///     with_temp_store(|store| {
///         assert!(store.all("notes").unwrap().is_empty());
///     });
/// }
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let test_store = TestStore::new();
    f(&test_store.store)
}
