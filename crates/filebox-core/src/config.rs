//! Settings for the reconciliation pipeline
//!
//! Loaded from `.toml`, `.json` or `.yaml` through [`ConfigStore`]. Every
//! section is optional:
//!
//! ```toml
//! [index]
//! backend = "file"
//! root = "/var/lib/filebox"
//!
//! [apply]
//! on_conflict = "reject"
//!
//! [compact]
//! survivors = "traversal"
//!
//! [io]
//! lock_timeout_ms = 5000
//! fsync = true
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use filebox_fs::{ConfigStore, NormalizedPath, RobustnessConfig};

use crate::Result;
use crate::apply::ConflictPolicy;
use crate::compact::SurvivorPolicy;
use crate::index::{DurableIndex, IndexStore, MemoryIndex};

/// Directory name used under the platform data dir when no root is set
const DEFAULT_DIR_NAME: &str = "filebox";

/// Which [`IndexStore`] implementation to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSection {
    #[serde(default)]
    pub backend: IndexBackend,
    /// Store directory for the file backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySection {
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactSection {
    #[serde(default)]
    pub survivors: SurvivorPolicy,
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_fsync() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoSection {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    #[serde(default = "default_fsync")]
    pub fsync: bool,
}

impl Default for IoSection {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            fsync: default_fsync(),
        }
    }
}

/// Parsed filebox settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub index: IndexSection,
    #[serde(default)]
    pub apply: ApplySection,
    #[serde(default)]
    pub compact: CompactSection,
    #[serde(default)]
    pub io: IoSection,
}

impl Settings {
    /// Load settings from a file; the format follows the extension.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::default().load(path)?)
    }

    /// Write these settings to `path` atomically, in the format its
    /// extension names.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        Ok(ConfigStore::new(self.robustness()).save(path, self)?)
    }

    /// Parse settings from TOML text.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(ConfigStore::default().parse(&NormalizedPath::new("settings.toml"), content)?)
    }

    pub fn robustness(&self) -> RobustnessConfig {
        RobustnessConfig {
            lock_timeout: Duration::from_millis(self.io.lock_timeout_ms),
            enable_fsync: self.io.fsync,
        }
    }

    /// Store directory: the configured root, else `<data dir>/filebox`, else
    /// `./.filebox`.
    pub fn index_root(&self) -> PathBuf {
        if let Some(root) = &self.index.root {
            return root.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(DEFAULT_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(format!(".{}", DEFAULT_DIR_NAME)))
    }

    /// Open the configured index store.
    pub fn open_store(&self) -> Result<Arc<dyn IndexStore>> {
        let store: Arc<dyn IndexStore> = match self.index.backend {
            IndexBackend::File => {
                Arc::new(DurableIndex::open_with(self.index_root(), self.robustness())?)
            }
            IndexBackend::Memory => Arc::new(MemoryIndex::new()),
        };
        Ok(store)
    }
}
