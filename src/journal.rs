//! Append-only write-ahead journal.
//!
//! Each line of the journal file is one JSON object:
//!
//! ```text
//! {"id":7,"op":"WRITE","ts":1700000000000,"status":"START","params":{"content":"hi","path":"/a"}}
//! ```
//!
//! A mutation appends a `START` line before it touches the tree and a
//! `COMMIT` line with the same id afterwards. Ids with a `START` but no
//! `COMMIT` are pending and get replayed at the next startup.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampMilliSeconds};
use std::collections::{BTreeMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::FsResult;
use crate::types::{OpKind, Phase};

/// One journal record. Entries are immutable once appended.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    /// Operation name; kept as text so an unrecognised kind still parses.
    #[serde(rename = "op")]
    pub operation: String,
    #[serde(rename = "ts")]
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: SystemTime,
    #[serde(rename = "status")]
    pub phase: Phase,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl JournalEntry {
    pub fn new(id: u64, kind: OpKind, params: BTreeMap<String, String>, phase: Phase) -> Self {
        Self {
            id,
            operation: kind.to_string(),
            timestamp: SystemTime::now(),
            phase,
            params,
        }
    }

    /// A `COMMIT` closing this entry's id, stamped now.
    pub fn to_commit(&self) -> Self {
        Self {
            id: self.id,
            operation: self.operation.clone(),
            timestamp: SystemTime::now(),
            phase: Phase::Commit,
            params: self.params.clone(),
        }
    }

    pub fn kind(&self) -> FsResult<OpKind> {
        self.operation.parse()
    }

    pub fn to_line(&self) -> FsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> FsResult<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// Handle to the journal file. Appends and scans are serialized by an
/// internal lock so a scan never observes a half-written append.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Journal {
    /// Open the journal at `path`, creating an empty file if needed.
    pub fn open(path: impl Into<PathBuf>) -> FsResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &JournalEntry) -> FsResult<()> {
        let line = entry.to_line()?;
        let _guard = self.lock.lock();

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        writer.get_ref().sync_data()?;

        debug!(id = entry.id, op = %entry.operation, phase = %entry.phase, "journal append");
        Ok(())
    }

    /// Every readable entry in append order
    pub fn entries(&self) -> FsResult<Vec<JournalEntry>> {
        let _guard = self.lock.lock();
        self.scan()
    }

    /// `START` entries whose id never appears as a `COMMIT`, in first-seen order
    pub fn uncommitted_starts(&self) -> FsResult<Vec<JournalEntry>> {
        let entries = self.entries()?;

        let mut starts: IndexMap<u64, JournalEntry> = IndexMap::new();
        let mut commits: HashSet<u64> = HashSet::new();
        for entry in entries {
            match entry.phase {
                Phase::Start => {
                    starts.insert(entry.id, entry);
                }
                Phase::Commit => {
                    commits.insert(entry.id);
                }
            }
        }

        Ok(starts
            .into_values()
            .filter(|entry| !commits.contains(&entry.id))
            .collect())
    }

    /// Largest id in the journal, 0 when empty
    pub fn max_id(&self) -> FsResult<u64> {
        Ok(self
            .entries()?
            .iter()
            .map(|entry| entry.id)
            .max()
            .unwrap_or(0))
    }

    /// Truncate the journal to empty
    pub fn clear(&self) -> FsResult<()> {
        let _guard = self.lock.lock();
        let file = File::create(&self.path)?;
        file.sync_all()?;
        Ok(())
    }

    fn scan(&self) -> FsResult<Vec<JournalEntry>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match JournalEntry::from_line(&line) {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    warn!(line = lineno + 1, %reason, "skipping unreadable journal line");
                }
            }
        }
        Ok(entries)
    }
}
