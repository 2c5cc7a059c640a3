use std::path::Path;

use filebox_fs::{NormalizedPath, RobustnessConfig, io};

use super::{FileTable, IndexStore, OwnerLease, OwnerLocks, TABLE_VERSION};
use crate::model::OwnerId;
use crate::{Error, Result};

/// Index store persisting one JSON document per owner under a root directory
///
/// Layout: `<root>/<owner>.json` holds the table and `<root>/<owner>.lock`
/// is held exclusively for the lifetime of a transaction, so writers in
/// other processes are serialized too. Commits replace the document with an
/// atomic rename.
#[derive(Debug)]
pub struct DurableIndex {
    root: NormalizedPath,
    robustness: RobustnessConfig,
    locks: OwnerLocks,
}

impl DurableIndex {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(root, RobustnessConfig::default())
    }

    pub fn open_with(root: impl AsRef<Path>, robustness: RobustnessConfig) -> Result<Self> {
        let root = NormalizedPath::new(root.as_ref());
        std::fs::create_dir_all(root.to_native())
            .map_err(|e| filebox_fs::Error::io(root.to_native(), e))?;
        tracing::debug!(root = %root, "Opened durable file index");
        Ok(Self {
            root,
            robustness,
            locks: OwnerLocks::new(),
        })
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn table_path(&self, owner: OwnerId) -> NormalizedPath {
        self.root.join(&format!("{}.json", owner))
    }

    fn lock_path(&self, owner: OwnerId) -> NormalizedPath {
        self.root.join(&format!("{}.lock", owner))
    }
}

impl IndexStore for DurableIndex {
    fn lock_owner(&self, owner: OwnerId) -> Result<OwnerLease<'_>> {
        let slot = self.locks.acquire(owner)?;
        let file_lock = io::lock_exclusive(&self.lock_path(owner), self.robustness.lock_timeout)
            .map_err(|e| Error::storage(owner, e))?;
        Ok(OwnerLease::new(slot, Some(file_lock)))
    }

    fn load(&self, owner: OwnerId) -> Result<FileTable> {
        let path = self.table_path(owner);
        let Some(content) = io::read_text_if_exists(&path).map_err(|e| Error::storage(owner, e))?
        else {
            return Ok(FileTable::new());
        };

        let table: FileTable =
            serde_json::from_str(&content).map_err(|e| Error::storage(owner, e))?;
        if table.version() != TABLE_VERSION {
            return Err(Error::storage(
                owner,
                format!("unsupported table version {} in {}", table.version(), path),
            ));
        }
        Ok(table)
    }

    fn persist(&self, owner: OwnerId, table: &FileTable) -> Result<()> {
        let content = serde_json::to_string_pretty(table).map_err(|e| Error::storage(owner, e))?;
        io::write_atomic(&self.table_path(owner), content.as_bytes(), self.robustness)
            .map_err(|e| Error::storage(owner, e))
    }
}
