//! Backlog Storage Layer
//!
//! SQLite-backed key/value storage standing in for browser local storage.
//! Multi-key writes go through `Database::transaction` so they land together.

mod database;
mod error;
mod migrations;

pub use database::{delete_item, read_item, write_item, Database};
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
