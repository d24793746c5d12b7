//! Sleeptrack Storage Layer
//!
//! SQLite-backed persistence for recorded nights and app settings.
//! The connection is shared behind a mutex; callers on an async runtime
//! are expected to hop onto a blocking thread before touching it.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
