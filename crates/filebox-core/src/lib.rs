//! Reconciliation core for filebox
//!
//! A client reports a batch of file creations and deletions. This crate
//! reduces the batch to its net effect and applies that to the owner's
//! persisted file index:
//!
//! ```text
//!   raw batch ──► compact ──► simplified batch ──┬──► apply (file index)
//!                                                └──► materialize (view)
//! ```
//!
//! - **compact**: cancels create/delete pairs per `(path, hash)`
//! - **apply**: inserts and deletes rows inside one per-owner transaction,
//!   checking existence and content hash before every deletion
//! - **materialize**: the file snapshots a simplified batch carries
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use filebox_core::{Applier, File, FileAction, MemoryIndex, User, compact};
//!
//! let batch = vec![
//!     FileAction::create(File::new("a.txt", "H1")),
//!     FileAction::delete(File::new("a.txt", "H1")),
//!     FileAction::create(File::new("a.txt", "H2")),
//! ];
//! let simplified = compact(&batch);
//! assert_eq!(simplified.len(), 1);
//!
//! let applier = Applier::new(Arc::new(MemoryIndex::new()));
//! let report = applier.apply(&simplified, &User::new(1, "me@example.com", "")).unwrap();
//! assert_eq!(report.inserted, ["a.txt"]);
//! ```

pub mod apply;
pub mod codec;
pub mod compact;
pub mod config;
pub mod credentials;
pub mod error;
pub mod index;
pub mod materialize;
pub mod model;
pub mod reconcile;

pub use apply::{Applier, ApplyReport, ConflictPolicy};
pub use compact::{CompactionStats, Compactor, SurvivorPolicy, compact};
pub use config::Settings;
pub use error::{Error, Result};
pub use index::{DurableIndex, FileTable, IndexStore, MemoryIndex, Transaction};
pub use materialize::{compute_files, materialize};
pub use model::{ActionKey, Client, File, FileAction, OwnerId, User};
pub use reconcile::{ReconcileReport, Reconciler};
