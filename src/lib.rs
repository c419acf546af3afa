//! walfs: an in-memory directory tree made crash-consistent by a
//! write-ahead journal and atomic whole-tree snapshots.

pub mod backend;
pub mod config;
pub mod error;
pub mod fs;
pub mod journal;
pub mod logging;
pub mod ops;
pub mod path;
pub mod shell;
pub mod snapshot;
pub mod tree;
pub mod types;

// Re-export
pub use backend::FsBackend;
pub use config::FsConfig;
pub use error::{FsError, FsResult};
pub use fs::{FileSystem, RecoveryReport};
pub use journal::{Journal, JournalEntry};
pub use tree::{Node, Tree};
pub use types::*;
