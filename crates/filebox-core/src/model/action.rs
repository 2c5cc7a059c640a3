use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::File;
use crate::{Error, Result};

/// One observed creation or deletion reported by a client
///
/// The embedded [`File`] is the file's state at the time of the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileAction {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub client_id: u64,
    pub is_create: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    pub file: File,
}

/// Bucketing key `(is_create, path, hash)` used while compacting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionKey<'a> {
    pub is_create: bool,
    pub path: &'a str,
    pub hash: &'a str,
}

impl ActionKey<'_> {
    /// The key of the action that would cancel this one.
    pub fn opposing(self) -> Self {
        Self {
            is_create: !self.is_create,
            ..self
        }
    }
}

impl FileAction {
    /// A creation of `file`.
    pub fn create(file: File) -> Self {
        Self {
            id: 0,
            client_id: 0,
            is_create: true,
            created_at: Utc::now(),
            file,
        }
    }

    /// A deletion of `file`.
    pub fn delete(file: File) -> Self {
        Self {
            is_create: false,
            ..Self::create(file)
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_client(mut self, client_id: u64) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn key(&self) -> ActionKey<'_> {
        ActionKey {
            is_create: self.is_create,
            path: &self.file.path,
            hash: &self.file.hash,
        }
    }

    pub fn path(&self) -> &str {
        &self.file.path
    }

    pub fn hash(&self) -> &str {
        &self.file.hash
    }

    /// Decode one client message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the payload is not a valid action.
    pub fn from_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| Error::MalformedInput {
            line: 1,
            message: e.to_string(),
        })
    }

    /// Encode this action as one client message.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
