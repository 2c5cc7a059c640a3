//! Error types for filebox-core

use crate::model::OwnerId;

/// Result type for filebox-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in filebox-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A client payload could not be decoded into a file action
    #[error("Malformed file action at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    /// A creation targets a path that already has a row
    #[error("Action {index}: {path} already exists in the file index")]
    Conflict { index: usize, path: String },

    /// A deletion targets a path with no row
    #[error("Action {index}: cannot delete {path}, no such file in the index")]
    MissingTarget { index: usize, path: String },

    /// A deletion targets content the index does not hold at that path
    #[error("Action {index}: hash mismatch deleting {path}: action has {expected}, index has {actual}")]
    HashMismatch {
        index: usize,
        path: String,
        expected: String,
        actual: String,
    },

    /// The underlying index store failed
    #[error("Storage error for owner {owner}: {source}")]
    Storage {
        owner: OwnerId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Password hashing or key generation failed
    #[error("Credential error: {message}")]
    Credentials { message: String },

    /// The supplied password does not match the stored hash
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Filesystem error from filebox-fs
    #[error(transparent)]
    Fs(#[from] filebox_fs::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn storage(
        owner: OwnerId,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Storage {
            owner,
            source: source.into(),
        }
    }

    pub fn credentials(message: impl std::fmt::Display) -> Self {
        Self::Credentials {
            message: message.to_string(),
        }
    }

    /// Whether this error rejects the batch contents rather than the
    /// environment (storage, credentials). Such batches should not be retried
    /// unchanged.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. } | Self::MissingTarget { .. } | Self::HashMismatch { .. }
        )
    }
}
