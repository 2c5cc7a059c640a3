use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{FileTable, IndexStore, OwnerLease, OwnerLocks};
use crate::Result;
use crate::model::OwnerId;

/// Index store kept entirely in memory
///
/// Useful for tests and for previewing a batch without touching disk.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    tables: Mutex<HashMap<OwnerId, FileTable>>,
    locks: OwnerLocks,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `owner` with an existing table.
    pub fn with_table(self, owner: OwnerId, table: FileTable) -> Self {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(owner, table);
        self
    }
}

impl IndexStore for MemoryIndex {
    fn lock_owner(&self, owner: OwnerId) -> Result<OwnerLease<'_>> {
        Ok(OwnerLease::new(self.locks.acquire(owner)?, None))
    }

    fn load(&self, owner: OwnerId) -> Result<FileTable> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.get(&owner).cloned().unwrap_or_default())
    }

    fn persist(&self, owner: OwnerId, table: &FileTable) -> Result<()> {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(owner, table.clone());
        Ok(())
    }
}
