//! Error types for filebox-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from filebox-core
    #[error(transparent)]
    Core(#[from] filebox_core::Error),

    /// Error from filebox-fs
    #[error(transparent)]
    Fs(#[from] filebox_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code: 2 for a batch the index refused, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(e) if e.is_integrity_violation() => 2,
            _ => 1,
        }
    }
}
