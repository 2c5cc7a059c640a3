//! SHA-256 content digests
//!
//! Digests are lowercase hex without a prefix, the same form clients send in
//! `File.hash`.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::{Error, Result};

/// Compute the SHA-256 hex digest of in-memory content.
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Compute the SHA-256 hex digest of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_hash(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(content_hash(&content))
}
