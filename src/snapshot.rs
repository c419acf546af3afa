//! Whole-tree snapshots written with temp-file-then-rename.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::FsResult;
use crate::tree::Tree;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next snapshot is staged in before the rename
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("snapshot"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Persist `tree`. The canonical file is only ever replaced by a fully
    /// written and synced temp file.
    pub fn save(&self, tree: &Tree) -> FsResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, tree)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    /// Load the last snapshot. A missing, unreadable or malformed snapshot
    /// yields `None`.
    pub fn load(&self) -> Option<Tree> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no snapshot, starting empty");
            return None;
        }

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "snapshot unreadable, starting empty"
                );
                return None;
            }
        };

        match serde_json::from_slice::<Tree>(&bytes) {
            Ok(tree) if tree.is_well_formed() => {
                info!(path = %self.path.display(), "snapshot loaded");
                Some(tree)
            }
            Ok(_) => {
                warn!(
                    path = %self.path.display(),
                    "snapshot root is not `/`, starting empty"
                );
                None
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "snapshot corrupt, starting empty"
                );
                None
            }
        }
    }
}
