//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] sleeptrack_storage::StorageError),

    #[error("Night error: {0}")]
    Night(#[from] sleeptrack_nights::NightError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] sleeptrack_tracker::TrackerError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
