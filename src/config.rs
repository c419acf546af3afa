//! Where the snapshot and the journal live.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_ENV: &str = "WALFS_SNAPSHOT";
pub const JOURNAL_ENV: &str = "WALFS_JOURNAL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    #[serde(default = "default_journal_path")]
    pub journal_path: PathBuf,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("fs.data")
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("journal.log")
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            journal_path: default_journal_path(),
        }
    }
}

impl FsConfig {
    /// Both files under `dir`, with their default names
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            snapshot_path: dir.join(default_snapshot_path()),
            journal_path: dir.join(default_journal_path()),
        }
    }

    /// Defaults overlaid with `WALFS_SNAPSHOT` / `WALFS_JOURNAL`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = env_path(SNAPSHOT_ENV) {
            config.snapshot_path = path;
        }
        if let Some(path) = env_path(JOURNAL_ENV) {
            config.journal_path = path;
        }
        config
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_journal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_path = path.into();
        self
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
