//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] backlog_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] backlog_session::SessionError),

    #[error("Client error: {0}")]
    Client(#[from] backlog_api::ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
