//! Sleeptrack Nights
//!
//! A night is one sleep-tracking interval. It is "in progress" while its end
//! timestamp still equals its start timestamp, and complete once stopped.
//! Nights are persisted through the [`NightStore`] trait; [`SqliteNightStore`]
//! is the on-device implementation.

mod error;
mod format;
mod night;
mod quality;
mod sqlite;
mod store;

pub use error::NightError;
pub use format::{format_duration, format_nights};
pub use night::Night;
pub use quality::SleepQuality;
pub use sqlite::SqliteNightStore;
pub use store::NightStore;

pub type Result<T> = std::result::Result<T, NightError>;
