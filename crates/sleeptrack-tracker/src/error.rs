//! Tracker error types

use sleeptrack_nights::NightError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Failed to read nights: {0}")]
    StoreRead(#[source] NightError),

    #[error("Failed to write night: {0}")]
    StoreWrite(#[source] NightError),

    #[error("Already tracking night {0}")]
    AlreadyTracking(i64),

    #[error("Started night was not found in progress after insert")]
    TonightMissing,

    #[error("Tracker has been stopped")]
    Stopped,
}
