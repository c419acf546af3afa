use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("name already exists: {0}")]
    NameCollision(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("the root directory cannot be removed or renamed")]
    RootImmutable,

    #[error("unknown journal operation: {0}")]
    UnknownOperation(String),

    // I/O and codec errors are stringified so they work with Serialize/Deserialize
    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("invalid argument: {0}")]
    Argument(String),
}

impl From<std::io::Error> for FsError {
    fn from(e: std::io::Error) -> Self {
        FsError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for FsError {
    fn from(e: serde_json::Error) -> Self {
        FsError::Persistence(e.to_string())
    }
}

pub type FsResult<T> = Result<T, FsError>;
