//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] backlog_storage::StorageError),

    #[error("Session is missing {0}")]
    Incomplete(&'static str),
}
