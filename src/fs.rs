//! The journaled file system: owns the tree, the journal and the snapshot
//! store, wraps every mutation in START -> apply -> COMMIT -> snapshot, and
//! replays pending entries at startup.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::backend::FsBackend;
use crate::config::FsConfig;
use crate::error::{FsError, FsResult};
use crate::journal::{Journal, JournalEntry};
use crate::ops::{Mode, Operation};
use crate::snapshot::SnapshotStore;
use crate::tree::{Node, Tree};
use crate::types::{DirEntry, Phase};

/// Outcome of a startup replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Uncommitted `START` entries found
    pub pending: usize,
    /// Entries re-applied without error
    pub replayed: usize,
    /// Entries whose replay failed and was skipped
    pub failed: usize,
}

#[derive(Debug)]
pub struct FileSystem {
    tree: RwLock<Tree>,
    journal: Journal,
    snapshots: SnapshotStore,
    /// Last id handed out
    seq: AtomicU64,
    /// Serializes whole journaled operations, snapshot saves and truncation
    op_lock: Mutex<()>,
}

impl FileSystem {
    /// Load the last snapshot, open the journal, seed the id sequence from
    /// the journal's largest id and replay pending entries.
    pub fn open(config: &FsConfig) -> FsResult<Self> {
        let snapshots = SnapshotStore::new(&config.snapshot_path);
        let tree = snapshots.load().unwrap_or_default();
        let journal = Journal::open(&config.journal_path)?;
        let last_id = journal.max_id()?;

        let fs = Self {
            tree: RwLock::new(tree),
            journal,
            snapshots,
            seq: AtomicU64::new(last_id),
            op_lock: Mutex::new(()),
        };
        fs.recover();
        Ok(fs)
    }

    /// Best-effort replay of every uncommitted `START`, in the order first
    /// written. Each one gets a `COMMIT` whether or not its replay worked,
    /// so it is never retried. Failures are logged, never returned.
    pub fn recover(&self) -> RecoveryReport {
        let _guard = self.op_lock.lock();
        let mut report = RecoveryReport::default();

        let pending = match self.journal.uncommitted_starts() {
            Ok(pending) => pending,
            Err(e) => {
                warn!(error = %e, "cannot read journal for recovery");
                return report;
            }
        };
        if pending.is_empty() {
            info!("journal clean, nothing to recover");
            return report;
        }

        report.pending = pending.len();
        info!(count = pending.len(), "recovering pending journal entries");

        let mut tree = self.tree.write();
        for entry in &pending {
            let replay =
                Operation::from_entry(entry).and_then(|op| op.apply(&mut tree, Mode::Replay));
            match replay {
                Ok(()) => {
                    report.replayed += 1;
                    info!(id = entry.id, op = %entry.operation, params = ?entry.params, "replayed");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        id = entry.id,
                        op = %entry.operation,
                        error = %e,
                        "replay failed, skipping"
                    );
                }
            }
            if let Err(e) = self.journal.append(&entry.to_commit()) {
                warn!(id = entry.id, error = %e, "cannot commit replayed entry");
            }
        }

        if let Err(e) = self.snapshots.save(&tree) {
            warn!(error = %e, "cannot save snapshot after recovery");
        }
        info!(
            replayed = report.replayed,
            failed = report.failed,
            "recovery complete"
        );
        report
    }

    /// Final save before the process exits
    pub fn shutdown(self) -> FsResult<()> {
        self.persist()
    }

    /// Copy of the current tree
    pub fn tree(&self) -> Tree {
        self.tree.read().clone()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Last journal id handed out
    pub fn last_id(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    fn journaled(&self, op: Operation) -> FsResult<()> {
        let _guard = self.op_lock.lock();

        let id = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let start = JournalEntry::new(id, op.kind(), op.params(), Phase::Start);
        self.journal.append(&start)?;

        // No rollback: a failed apply leaves START pending for the next recovery.
        op.apply(&mut self.tree.write(), Mode::Foreground)
            .inspect_err(|e| debug!(id, op = %op.kind(), error = %e, "apply failed"))?;

        self.journal.append(&start.to_commit())?;
        info!(id, op = %op.kind(), "committed");

        self.save_snapshot()
    }

    fn save_snapshot(&self) -> FsResult<()> {
        let tree = self.tree.read();
        self.snapshots.save(&tree)
    }
}

impl FsBackend for FileSystem {
    fn create_directory(&self, path: &str) -> FsResult<()> {
        self.journaled(Operation::CreateDirectory {
            path: path.to_string(),
        })
    }

    fn remove_directory(&self, path: &str) -> FsResult<()> {
        self.journaled(Operation::RemoveDirectory {
            path: path.to_string(),
        })
    }

    fn create_file(&self, path: &str) -> FsResult<()> {
        self.journaled(Operation::CreateFile {
            path: path.to_string(),
        })
    }

    fn delete_file(&self, path: &str) -> FsResult<()> {
        self.journaled(Operation::DeleteFile {
            path: path.to_string(),
        })
    }

    fn write(&self, path: &str, content: &str) -> FsResult<()> {
        self.journaled(Operation::Write {
            path: path.to_string(),
            content: content.to_string(),
        })
    }

    fn read(&self, path: &str) -> FsResult<String> {
        self.tree
            .read()
            .get(path)
            .and_then(Node::content)
            .map(str::to_string)
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    fn list(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        self.tree.read().list(path)
    }

    fn copy(&self, src: &str, dest: &str) -> FsResult<()> {
        self.journaled(Operation::Copy {
            src: src.to_string(),
            dest: dest.to_string(),
        })
    }

    fn rename(&self, src: &str, dest: &str) -> FsResult<()> {
        self.journaled(Operation::Rename {
            src: src.to_string(),
            dest: dest.to_string(),
        })
    }

    fn journal_entries(&self) -> FsResult<Vec<JournalEntry>> {
        self.journal.entries()
    }

    /// Truncate the journal. The id sequence is not reset.
    fn clear_journal(&self) -> FsResult<()> {
        let _guard = self.op_lock.lock();
        self.journal.clear()?;
        info!("journal cleared");
        Ok(())
    }

    fn persist(&self) -> FsResult<()> {
        let _guard = self.op_lock.lock();
        self.save_snapshot()
    }
}
