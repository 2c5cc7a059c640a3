//! Filesystem primitives for filebox
//!
//! Provides normalized paths, locked atomic I/O, content checksums and a
//! format-agnostic configuration store.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use io::{LockGuard, RobustnessConfig};
pub use path::NormalizedPath;
