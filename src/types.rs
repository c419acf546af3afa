//! Core types shared by the tree, the journal and the shell: node kinds,
//! listing entries and journal operation tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use crate::error::FsError;

/// Path separator, also the name of the root directory.
pub const SEPARATOR: &str = "/";

/// Enum for distinguishing node kinds at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    File,
    Dir,
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub file_type: FileType,
    /// Content length in bytes (0 for directories)
    pub size: u64,
    #[serde(with = "serde_millis")]
    pub created_at: SystemTime,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Dir
    }
}

/// Kind of a journaled mutation, as written in the `op` field of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Mkdir,
    Rmdir,
    Touch,
    Rm,
    Write,
    Cp,
    Mv,
}

impl OpKind {
    pub const ALL: [OpKind; 7] = [
        OpKind::Mkdir,
        OpKind::Rmdir,
        OpKind::Touch,
        OpKind::Rm,
        OpKind::Write,
        OpKind::Cp,
        OpKind::Mv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Mkdir => "MKDIR",
            OpKind::Rmdir => "RMDIR",
            OpKind::Touch => "TOUCH",
            OpKind::Rm => "RM",
            OpKind::Write => "WRITE",
            OpKind::Cp => "CP",
            OpKind::Mv => "MV",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FsError::UnknownOperation(s.to_string()))
    }
}

/// Phase of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Start,
    Commit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Start => f.write_str("START"),
            Phase::Commit => f.write_str("COMMIT"),
        }
    }
}
