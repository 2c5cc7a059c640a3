//! End-to-end reconciliation of one client batch
//!
//! decode → compact → apply, returning what happened at each stage.

use serde::{Deserialize, Serialize};

use crate::apply::{Applier, ApplyReport};
use crate::codec;
use crate::compact::{CompactionStats, Compactor};
use crate::config::Settings;
use crate::model::{FileAction, User};
use crate::Result;

/// Outcome of one reconciled batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub compaction: CompactionStats,
    pub applied: ApplyReport,
}

/// Compacts client batches and applies them to the file index
#[derive(Debug, Clone)]
pub struct Reconciler {
    compactor: Compactor,
    applier: Applier,
}

impl Reconciler {
    pub fn new(applier: Applier) -> Self {
        Self {
            compactor: Compactor::default(),
            applier,
        }
    }

    pub fn with_compactor(mut self, compactor: Compactor) -> Self {
        self.compactor = compactor;
        self
    }

    /// Build a reconciler with the store and policies named in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let applier =
            Applier::new(settings.open_store()?).with_conflict_policy(settings.apply.on_conflict);
        Ok(Self::new(applier)
            .with_compactor(Compactor::with_policy(settings.compact.survivors)))
    }

    pub fn applier(&self) -> &Applier {
        &self.applier
    }

    pub fn compactor(&self) -> &Compactor {
        &self.compactor
    }

    /// Compact `actions` and apply the survivors to `owner`'s index.
    pub fn reconcile(&self, actions: &[FileAction], owner: &User) -> Result<ReconcileReport> {
        let (simplified, compaction) = self.compactor.compact_with_stats(actions);
        let applied = self.applier.apply(&simplified, owner)?;
        Ok(ReconcileReport {
            compaction,
            applied,
        })
    }

    /// Decode raw client messages, then [`Reconciler::reconcile`] them.
    ///
    /// Nothing is applied if any message is malformed.
    pub fn reconcile_messages<S: AsRef<str>>(
        &self,
        messages: &[S],
        owner: &User,
    ) -> Result<ReconcileReport> {
        let actions = codec::decode_messages(messages)?;
        self.reconcile(&actions, owner)
    }
}
