//! Sleeptrack Tracker
//!
//! Owns the "tonight" session: whether a night is currently being tracked,
//! and the start/stop/clear commands that move between those states.
//! - State lives in a single actor task; commands are queued and applied in order
//! - Store I/O is awaited by the actor, state is only touched after it returns
//! - Observers read a [`TrackerView`] from a watch channel and receive
//!   one-shot [`TrackerEvent`]s such as "navigate to the quality screen"

mod error;
mod state;
mod tracker;
mod view;

pub use error::TrackerError;
pub use state::TrackerState;
pub use tracker::{EventReceiver, NightTracker, TrackerHandle};
pub use view::{CommandKind, TrackerEvent, TrackerView};

pub type Result<T> = std::result::Result<T, TrackerError>;
