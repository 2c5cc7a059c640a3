//! Hash command: snapshot local files as actions

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use filebox_core::{File, FileAction};
use filebox_fs::{NormalizedPath, checksum};

use crate::error::{CliError, Result};

/// Run the hash command
pub fn run_hash(paths: &[PathBuf], delete: bool, client: u64) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for path in paths {
        let file = snapshot(path)?;
        let action = if delete {
            FileAction::delete(file)
        } else {
            FileAction::create(file)
        };
        writeln!(out, "{}", action.with_client(client).to_json()?)?;
    }
    Ok(())
}

/// Describe the file at `path` the way a client reports it.
pub fn snapshot(path: &Path) -> Result<File> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(CliError::user(format!("{} is not a regular file", path.display())));
    }

    let hash = checksum::file_hash(path)?;
    let modified: DateTime<Utc> = metadata.modified()?.into();
    let normalized = NormalizedPath::new(path);
    tracing::debug!(path = %normalized, hash = %hash, "Hashed local file");

    Ok(File::new(normalized.as_str(), hash)
        .with_size(metadata.len())
        .with_modified(modified))
}
