//! Terse constructors for file actions and owners.

use chrono::{DateTime, TimeZone, Utc};
use filebox_core::{File, FileAction, OwnerId, User};

/// A creation of `path` with content digest `hash`.
pub fn create(path: &str, hash: &str) -> FileAction {
    FileAction::create(File::new(path, hash))
}

/// A deletion of `path` with content digest `hash`.
pub fn delete(path: &str, hash: &str) -> FileAction {
    FileAction::delete(File::new(path, hash))
}

/// `secs` seconds after the Unix epoch.
///
/// # Panics
/// Panics if `secs` is out of range for a timestamp.
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or_else(|| panic!("ts: {secs} is not a valid timestamp"))
}

/// `action` stamped at `secs` seconds after the epoch.
pub fn at(action: FileAction, secs: i64) -> FileAction {
    action.with_created_at(ts(secs))
}

/// An owner with no password set.
pub fn user(id: OwnerId) -> User {
    User::new(id, format!("user{id}@example.com"), "")
}

/// The `(is_create, path, hash)` triples of `actions`, for compact assertions.
pub fn triples(actions: &[FileAction]) -> Vec<(bool, String, String)> {
    actions
        .iter()
        .map(|a| (a.is_create, a.file.path.clone(), a.file.hash.clone()))
        .collect()
}
