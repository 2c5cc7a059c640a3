//! Command implementations for filebox-cli

pub mod account;
pub mod apply;
pub mod batch;
pub mod hash;
pub mod init;

pub use account::{run_client_key, run_register};
pub use apply::{run_apply, run_ls};
pub use batch::{run_compact, run_files};
pub use hash::run_hash;
pub use init::run_init;

use std::io::Read;
use std::path::Path;

use filebox_core::config::IndexBackend;
use filebox_core::{FileAction, Settings, codec};
use filebox_fs::NormalizedPath;

use crate::cli::StoreArgs;
use crate::error::{CliError, Result};

/// Read a JSON Lines batch from `input`, or from stdin when it is `-`.
pub(crate) fn read_batch(input: &Path) -> Result<Vec<FileAction>> {
    let content = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        filebox_fs::io::read_text(&NormalizedPath::new(input))?
    };
    let actions = codec::decode_batch(&content)?;
    tracing::debug!(actions = actions.len(), "Read action batch");
    Ok(actions)
}

/// Settings from `--config` (or defaults) with `--root` applied on top.
pub(crate) fn resolve_settings(store: &StoreArgs) -> Result<Settings> {
    let mut settings = match &store.config {
        Some(path) => Settings::load(&NormalizedPath::new(path))?,
        None => Settings::default(),
    };
    if let Some(root) = &store.root {
        settings.index.root = Some(root.clone());
    }
    Ok(settings)
}

/// Reject settings whose index would vanish when the process exits.
pub(crate) fn require_durable(settings: &Settings) -> Result<()> {
    match settings.index.backend {
        IndexBackend::File => Ok(()),
        IndexBackend::Memory => Err(CliError::user(
            "the memory index backend is not persisted between runs; set index.backend = \"file\"",
        )),
    }
}
