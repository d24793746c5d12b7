//! Tracker State Machine
//!
//! ```text
//! Idle ──start──▶ Tracking
//!  ▲                 │
//!  └──stop / clear───┘
//! ```
//! `clear` from `Idle` stays `Idle`. `start` from `Tracking` is rejected.

use serde::{Deserialize, Serialize};
use sleeptrack_nights::Night;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerState {
    /// No night in progress
    Idle,
    /// A night has been started and not yet stopped
    Tracking,
}

impl TrackerState {
    /// State implied by the current tonight slot
    pub fn of(current: Option<&Night>) -> Self {
        match current {
            Some(_) => TrackerState::Tracking,
            None => TrackerState::Idle,
        }
    }

    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: TrackerState) -> bool {
        match (self, target) {
            (TrackerState::Idle, TrackerState::Tracking) => true,
            (TrackerState::Tracking, TrackerState::Idle) => true,
            (TrackerState::Idle, TrackerState::Idle) => true,
            // A second start would leave two nights in progress
            (TrackerState::Tracking, TrackerState::Tracking) => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerState::Idle => "idle",
            TrackerState::Tracking => "tracking",
        }
    }
}

impl std::fmt::Display for TrackerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(TrackerState::Idle.can_transition_to(TrackerState::Tracking));
        assert!(TrackerState::Tracking.can_transition_to(TrackerState::Idle));
        assert!(TrackerState::Idle.can_transition_to(TrackerState::Idle));
    }

    #[test]
    fn test_double_start_rejected() {
        assert!(!TrackerState::Tracking.can_transition_to(TrackerState::Tracking));
    }

    #[test]
    fn test_state_of_current() {
        let night = Night::begin();
        assert_eq!(TrackerState::of(Some(&night)), TrackerState::Tracking);
        assert_eq!(TrackerState::of(None), TrackerState::Idle);
    }
}
