//! Night error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NightError {
    #[error("Night not found: {0}")]
    NotFound(i64),

    #[error("Night {0} is still in progress")]
    InProgress(i64),

    #[error("Invalid sleep quality: {0} (expected 0..=5)")]
    InvalidQuality(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] sleeptrack_storage::StorageError),

    #[error("Storage worker failed: {0}")]
    Worker(String),
}

