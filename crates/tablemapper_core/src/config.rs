//! Connection source configuration.
//!
//! # Responsibility
//! - Describe how file-backed sources open and configure SQLite connections.
//! - Stay format-agnostic: hosts deserialize it from whatever they use.
//!
//! # Invariants
//! - Every field has a default, so partial documents are accepted.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Settings applied to every connection a file-backed source opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Database file path.
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Enforce foreign key constraints (`PRAGMA foreign_keys = ON`).
    pub foreign_keys: bool,
    /// Open connections read-only.
    pub read_only: bool,
}

impl SourceConfig {
    /// Creates a config for `path` with default connection settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tablemapper.sqlite3"),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            foreign_keys: true,
            read_only: false,
        }
    }
}
