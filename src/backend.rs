use crate::error::FsResult;
use crate::journal::JournalEntry;
use crate::types::DirEntry;

/// Operations a command front end drives. Paths are absolute with no
/// trailing separator except the root itself.
pub trait FsBackend {
    fn create_directory(&self, path: &str) -> FsResult<()>;

    fn remove_directory(&self, path: &str) -> FsResult<()>;

    fn create_file(&self, path: &str) -> FsResult<()>;

    fn delete_file(&self, path: &str) -> FsResult<()>;

    /// Replace the content of `path`, creating the file if it is absent.
    fn write(&self, path: &str, content: &str) -> FsResult<()>;

    fn read(&self, path: &str) -> FsResult<String>;

    fn list(&self, path: &str) -> FsResult<Vec<DirEntry>>;

    fn copy(&self, src: &str, dest: &str) -> FsResult<()>;

    fn rename(&self, src: &str, dest: &str) -> FsResult<()>;

    /// Every journal entry in append order
    fn journal_entries(&self) -> FsResult<Vec<JournalEntry>>;

    fn clear_journal(&self) -> FsResult<()>;

    /// Force an out-of-band snapshot save
    fn persist(&self) -> FsResult<()>;
}
