use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OwnerId;

/// A named, hashed, sized filesystem object belonging to a user
///
/// `path` is unique within one owner's namespace; `(path, hash)` identifies
/// one exact content at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct File {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub user_id: OwnerId,
    #[serde(default)]
    pub name: String,
    /// Hex-encoded content digest
    pub hash: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified: DateTime<Utc>,
    pub path: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl File {
    /// Create a snapshot for `path` with content digest `hash`.
    ///
    /// The name is the last path segment; size and times are left at their
    /// defaults.
    pub fn new(path: impl Into<String>, hash: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            id: 0,
            user_id: 0,
            name,
            hash: hash.into(),
            size: 0,
            modified: DateTime::<Utc>::default(),
            path,
            created_at: DateTime::<Utc>::default(),
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = modified;
        self
    }
}
