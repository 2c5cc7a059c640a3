//! [`TestStore`]: a durable index rooted in a temporary directory.

use std::path::Path;
use std::sync::Arc;

use filebox_core::{DurableIndex, FileTable, IndexStore, OwnerId};
use tempfile::TempDir;

/// A [`DurableIndex`] in a temp directory that is removed on drop.
///
/// # Example
///
/// ```rust,no_run
/// use filebox_test_utils::store::TestStore;
///
/// let store = TestStore::new();
/// store.assert_empty(1);
/// ```
pub struct TestStore {
    temp_dir: TempDir,
    index: Arc<DurableIndex>,
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStore {
    /// Create an empty store.
    ///
    /// # Panics
    /// Panics if the temp directory or store cannot be created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("TestStore::new: failed to create temp dir");
        let index = DurableIndex::open(temp_dir.path().join("index"))
            .expect("TestStore::new: failed to open index");
        Self {
            temp_dir,
            index: Arc::new(index),
        }
    }

    /// Root of the temporary directory (the index lives in `index/` below it).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The store as an injectable capability.
    pub fn index(&self) -> Arc<dyn IndexStore> {
        self.index.clone()
    }

    /// A second handle on the same directory, as another process would open it.
    ///
    /// # Panics
    /// Panics if the store cannot be opened.
    pub fn reopen(&self) -> DurableIndex {
        DurableIndex::open(self.index.root().to_native())
            .expect("TestStore::reopen: failed to open index")
    }

    /// Current table of `owner`.
    ///
    /// # Panics
    /// Panics if the table cannot be loaded.
    pub fn table(&self, owner: OwnerId) -> FileTable {
        self.index
            .load(owner)
            .unwrap_or_else(|e| panic!("TestStore::table: failed to load owner {owner}: {e}"))
    }

    /// `(path, hash)` of every row of `owner`, in path order.
    pub fn rows(&self, owner: OwnerId) -> Vec<(String, String)> {
        self.table(owner)
            .files()
            .map(|f| (f.path.clone(), f.hash.clone()))
            .collect()
    }

    /// Assert `owner` has a row at `path` holding `hash`.
    ///
    /// # Panics
    /// Panics with a descriptive message otherwise.
    pub fn assert_row(&self, owner: OwnerId, path: &str, hash: &str) {
        let table = self.table(owner);
        match table.get(path) {
            Some(row) => assert_eq!(
                row.hash, hash,
                "Row {path} of owner {owner} has hash {}, expected {hash}",
                row.hash
            ),
            None => panic!("Expected row {path} for owner {owner}, rows: {:?}", self.rows(owner)),
        }
    }

    /// Assert `owner` has no rows.
    ///
    /// # Panics
    /// Panics with a descriptive message otherwise.
    pub fn assert_empty(&self, owner: OwnerId) {
        let rows = self.rows(owner);
        assert!(rows.is_empty(), "Expected no rows for owner {owner}, got {rows:?}");
    }
}
