//! Persisted file index
//!
//! Each owner's files live in a [`FileTable`] keyed by path. Stores are
//! injected behind the [`IndexStore`] trait; all mutation goes through a
//! [`Transaction`], which holds the owner's lease for its whole lifetime and
//! persists the table in one step on commit. Dropping a transaction without
//! committing discards its changes.

mod durable;
mod memory;

pub use durable::DurableIndex;
pub use memory::MemoryIndex;

use std::collections::{BTreeMap, HashSet};
use std::sync::{Condvar, Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use filebox_fs::LockGuard;

use crate::model::{File, OwnerId};
use crate::{Error, Result};

const TABLE_VERSION: &str = "1.0";

/// One owner's files, keyed by path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTable {
    /// Table format version for forward compatibility
    version: String,
    /// Next row id to hand out
    next_id: u64,
    files: BTreeMap<String, File>,
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTable {
    pub fn new() -> Self {
        Self {
            version: TABLE_VERSION.to_string(),
            next_id: 1,
            files: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, path: &str) -> Option<&File> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Insert a new row, assigning it a fresh id and creation time.
    ///
    /// Overwrites any row at the same path; callers check for conflicts.
    pub fn insert(&mut self, mut file: File) -> u64 {
        file.id = self.next_id;
        file.created_at = Utc::now();
        self.next_id += 1;
        let id = file.id;
        self.files.insert(file.path.clone(), file);
        id
    }

    /// Replace the row at `file.path`, keeping its id and creation time.
    ///
    /// Falls back to [`FileTable::insert`] when no row exists.
    pub fn replace(&mut self, mut file: File) -> u64 {
        match self.files.get_mut(&file.path) {
            Some(existing) => {
                file.id = existing.id;
                file.created_at = existing.created_at;
                *existing = file;
                existing.id
            }
            None => self.insert(file),
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<File> {
        self.files.remove(path)
    }

    /// Rows in path order.
    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Storage backend for per-owner file tables
///
/// Implementations must make [`IndexStore::persist`] all-or-nothing and must
/// not hand out two leases for the same owner at once.
pub trait IndexStore: Send + Sync {
    /// Block until this caller is the only writer for `owner`.
    fn lock_owner(&self, owner: OwnerId) -> Result<OwnerLease<'_>>;

    /// Read the current table for `owner`; an unknown owner has an empty table.
    fn load(&self, owner: OwnerId) -> Result<FileTable>;

    /// Replace the stored table for `owner`.
    fn persist(&self, owner: OwnerId, table: &FileTable) -> Result<()>;
}

/// In-process registry of owners with an open transaction
#[derive(Debug, Default)]
pub struct OwnerLocks {
    held: Mutex<HashSet<OwnerId>>,
    released: Condvar,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other slot for `owner` is held, then take it.
    pub fn acquire(&self, owner: OwnerId) -> Result<OwnerSlot<'_>> {
        let poisoned = |_| Error::storage(owner, "owner lock registry poisoned");
        let mut held = self.held.lock().map_err(poisoned)?;
        while held.contains(&owner) {
            held = self.released.wait(held).map_err(poisoned)?;
        }
        held.insert(owner);
        Ok(OwnerSlot { locks: self, owner })
    }

    pub fn is_held(&self, owner: OwnerId) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&owner)
    }
}

/// A held entry in [`OwnerLocks`], released on drop
#[derive(Debug)]
pub struct OwnerSlot<'a> {
    locks: &'a OwnerLocks,
    owner: OwnerId,
}

impl Drop for OwnerSlot<'_> {
    fn drop(&mut self) {
        let mut held = self
            .locks
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.owner);
        self.locks.released.notify_all();
    }
}

/// Exclusive right to write one owner's table
///
/// Combines the in-process slot with an optional cross-process file lock.
#[derive(Debug)]
pub struct OwnerLease<'a> {
    owner: OwnerId,
    // Dropped first: the file lock goes before the in-process slot
    _file_lock: Option<LockGuard>,
    _slot: OwnerSlot<'a>,
}

impl<'a> OwnerLease<'a> {
    pub fn new(slot: OwnerSlot<'a>, file_lock: Option<LockGuard>) -> Self {
        Self {
            owner: slot.owner,
            _file_lock: file_lock,
            _slot: slot,
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }
}

/// All-or-nothing unit of work over one owner's table
pub struct Transaction<'a> {
    store: &'a dyn IndexStore,
    table: FileTable,
    dirty: bool,
    lease: OwnerLease<'a>,
}

impl<'a> Transaction<'a> {
    /// Take the owner's lease and load their table.
    pub fn begin(store: &'a dyn IndexStore, owner: OwnerId) -> Result<Self> {
        let lease = store.lock_owner(owner)?;
        let table = store.load(owner)?;
        tracing::trace!(owner, rows = table.len(), "Transaction started");
        Ok(Self {
            store,
            table,
            dirty: false,
            lease,
        })
    }

    pub fn owner(&self) -> OwnerId {
        self.lease.owner()
    }

    pub fn find(&self, path: &str) -> Option<&File> {
        self.table.get(path)
    }

    pub fn insert(&mut self, file: File) -> u64 {
        self.dirty = true;
        self.table.insert(file)
    }

    pub fn replace(&mut self, file: File) -> u64 {
        self.dirty = true;
        self.table.replace(file)
    }

    pub fn delete(&mut self, path: &str) -> Option<File> {
        let removed = self.table.remove(path);
        self.dirty |= removed.is_some();
        removed
    }

    /// Persist the working copy and release the lease.
    pub fn commit(self) -> Result<()> {
        if self.dirty {
            self.store.persist(self.owner(), &self.table)?;
            tracing::trace!(owner = self.owner(), rows = self.table.len(), "Transaction committed");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("owner", &self.owner())
            .field("rows", &self.table.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
