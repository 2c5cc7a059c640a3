//! Data model shared by the compactor, the applier and the stores
//!
//! Field names serialize in the PascalCase form clients put on the wire.

mod account;
mod action;
mod file;

pub use account::{Client, User};
pub use action::{ActionKey, FileAction};
pub use file::File;

/// Identifier of the user owning a namespace of files
pub type OwnerId = u64;
