//! Application of a simplified batch to the persisted file index
//!
//! The whole batch runs in one [`Transaction`]: every check sees the effects
//! of earlier actions in the same batch, and the first failing action aborts
//! the batch with nothing persisted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::index::{IndexStore, Transaction};
use crate::model::{FileAction, OwnerId, User};
use crate::{Error, Result};

/// What to do when a creation targets a path that already has a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Fail the batch with [`Error::Conflict`]
    #[default]
    Reject,
    /// Overwrite the existing row, keeping its id
    Replace,
}

/// Paths touched by one applied batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub owner: OwnerId,
    pub inserted: Vec<String>,
    pub replaced: Vec<String>,
    pub deleted: Vec<String>,
}

impl ApplyReport {
    fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    /// Number of rows written or removed.
    pub fn changes(&self) -> usize {
        self.inserted.len() + self.replaced.len() + self.deleted.len()
    }

    pub fn is_noop(&self) -> bool {
        self.changes() == 0
    }
}

/// Applies simplified batches to an injected [`IndexStore`]
#[derive(Clone)]
pub struct Applier {
    store: Arc<dyn IndexStore>,
    on_conflict: ConflictPolicy,
}

impl Applier {
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self {
            store,
            on_conflict: ConflictPolicy::default(),
        }
    }

    pub fn with_conflict_policy(mut self, on_conflict: ConflictPolicy) -> Self {
        self.on_conflict = on_conflict;
        self
    }

    pub fn store(&self) -> &Arc<dyn IndexStore> {
        &self.store
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.on_conflict
    }

    /// Apply `simplified` to `owner`'s index.
    ///
    /// # Errors
    ///
    /// - [`Error::Conflict`] for a creation over an existing path under
    ///   [`ConflictPolicy::Reject`]
    /// - [`Error::MissingTarget`] for a deletion of a path with no row
    /// - [`Error::HashMismatch`] for a deletion whose hash differs from the row
    /// - [`Error::Storage`] if the store fails
    ///
    /// On any error the index is left as it was before the call.
    pub fn apply(&self, simplified: &[FileAction], owner: &User) -> Result<ApplyReport> {
        let mut txn = Transaction::begin(self.store.as_ref(), owner.id)?;

        let report = match self.apply_in(&mut txn, simplified) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(owner = owner.id, error = %e, "Rejected action batch");
                return Err(e);
            }
        };

        txn.commit()?;
        tracing::info!(
            owner = owner.id,
            inserted = report.inserted.len(),
            replaced = report.replaced.len(),
            deleted = report.deleted.len(),
            "Applied action batch"
        );
        Ok(report)
    }

    fn apply_in(&self, txn: &mut Transaction<'_>, simplified: &[FileAction]) -> Result<ApplyReport> {
        let mut report = ApplyReport::new(txn.owner());

        for (index, action) in simplified.iter().enumerate() {
            let path = action.path();

            if action.is_create {
                let mut file = action.file.clone();
                file.user_id = txn.owner();

                if txn.find(path).is_none() {
                    let id = txn.insert(file);
                    tracing::debug!(index, path, id, "Inserted file");
                    report.inserted.push(path.to_string());
                    continue;
                }

                match self.on_conflict {
                    ConflictPolicy::Reject => {
                        return Err(Error::Conflict {
                            index,
                            path: path.to_string(),
                        });
                    }
                    ConflictPolicy::Replace => {
                        let id = txn.replace(file);
                        tracing::debug!(index, path, id, "Replaced file");
                        report.replaced.push(path.to_string());
                    }
                }
            } else {
                let stored = txn.find(path).ok_or_else(|| Error::MissingTarget {
                    index,
                    path: path.to_string(),
                })?;

                if stored.hash != action.hash() {
                    return Err(Error::HashMismatch {
                        index,
                        path: path.to_string(),
                        expected: action.hash().to_string(),
                        actual: stored.hash.clone(),
                    });
                }

                txn.delete(path);
                tracing::debug!(index, path, "Deleted file");
                report.deleted.push(path.to_string());
            }
        }

        Ok(report)
    }
}

impl std::fmt::Debug for Applier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier")
            .field("on_conflict", &self.on_conflict)
            .finish_non_exhaustive()
    }
}
