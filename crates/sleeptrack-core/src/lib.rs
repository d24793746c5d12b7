//! Sleeptrack Core
//!
//! Wires the SQLite store, the night tracker and the rating operations
//! together behind [`SleepTracker`]. The UI layer only ever talks to this
//! crate and to the tracker's view and event channels.

mod app;
mod config;
mod error;

pub use app::SleepTracker;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use sleeptrack_nights::{
    format_duration, format_nights, Night, NightError, NightStore, SleepQuality,
    SqliteNightStore,
};
pub use sleeptrack_storage::{Database, StorageError};
pub use sleeptrack_tracker::{
    CommandKind, EventReceiver, NightTracker, TrackerError, TrackerEvent, TrackerHandle,
    TrackerState, TrackerView,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A host that already installed a subscriber keeps it
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
