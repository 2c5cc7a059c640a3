//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Knobs controlling lock waiting and durability of writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying a contended lock before giving up
    pub lock_timeout: Duration,
    /// Whether to fsync temp files before renaming them into place
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// An exclusive advisory lock on a lock file.
///
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: NormalizedPath,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path, error = %e, "Failed to release lock");
        }
    }
}

/// Acquire an exclusive lock on `lock_path`, creating the file if needed.
///
/// Contention is retried with exponential backoff until `timeout` elapses.
pub fn lock_exclusive(lock_path: &NormalizedPath, timeout: Duration) -> Result<LockGuard> {
    let native = lock_path.to_native();
    if let Some(parent) = native.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&native)
        .map_err(|e| Error::io(&native, e))?;

    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(5))
        .with_max_interval(Duration::from_millis(250))
        .with_max_elapsed_time(Some(timeout))
        .build();

    let contended = fs2::lock_contended_error().kind();
    let attempt = || {
        FileExt::try_lock_exclusive(&file).map_err(|e| {
            if e.kind() == contended {
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    };

    match backoff::retry(policy, attempt) {
        Ok(()) => Ok(LockGuard {
            file,
            path: lock_path.clone(),
        }),
        Err(backoff::Error::Transient { .. }) => Err(Error::LockTimeout {
            path: native,
            timeout,
        }),
        Err(backoff::Error::Permanent(e)) => {
            tracing::debug!(path = %lock_path, error = %e, "Lock attempt failed");
            Err(Error::LockFailed { path: native })
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Takes an exclusive lock on `<path>.lock`, writes to a temp file in the same
/// directory and renames it over the target. Readers see either the old or
/// the new content, never a partial write.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let _lock = lock_exclusive(&path.with_suffix(".lock"), config.lock_timeout)?;

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name().unwrap_or("file"),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let replaced = write_temp(&temp_path, content, config.enable_fsync).and_then(|()| {
        fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))
    });
    if let Err(e) = replaced {
        if let Err(cleanup) = fs::remove_file(&temp_path)
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
        }
        return Err(e);
    }

    tracing::trace!(path = %path, bytes = content.len(), "Wrote file atomically");
    Ok(())
}

fn write_temp(temp_path: &Path, content: &[u8], fsync: bool) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file, or `None` if it does not exist.
pub fn read_text_if_exists(path: &NormalizedPath) -> Result<Option<String>> {
    let native_path = path.to_native();
    match fs::read_to_string(&native_path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}
