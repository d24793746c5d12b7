//! What observers see
//!
//! [`TrackerView`] is the derived state republished after every change;
//! [`TrackerEvent`]s are discrete and delivered once each.

use serde::Serialize;
use sleeptrack_nights::{format_nights, Night};

use crate::state::TrackerState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerView {
    pub state: TrackerState,
    /// The night being tracked, if any
    pub current: Option<Night>,
    /// Start button visible
    pub can_start: bool,
    /// Stop button visible
    pub can_stop: bool,
    /// Clear button visible
    pub can_clear: bool,
    /// All nights, newest first
    pub nights: Vec<Night>,
    /// `nights` rendered for display
    pub summary: String,
    /// Last stopped night until the observer acknowledges it
    pub pending_navigation: Option<Night>,
}

impl TrackerView {
    pub fn derive(
        current: Option<&Night>,
        nights: &[Night],
        pending_navigation: Option<&Night>,
    ) -> Self {
        Self {
            state: TrackerState::of(current),
            current: current.cloned(),
            can_start: current.is_none(),
            can_stop: current.is_some(),
            can_clear: !nights.is_empty(),
            nights: nights.to_vec(),
            summary: format_nights(nights),
            pending_navigation: pending_navigation.cloned(),
        }
    }
}

impl Default for TrackerView {
    fn default() -> Self {
        Self::derive(None, &[], None)
    }
}

/// Which command an event or failure relates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Initialize,
    Start,
    Stop,
    Clear,
    Refresh,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Initialize => "initialize",
            CommandKind::Start => "start",
            CommandKind::Stop => "stop",
            CommandKind::Clear => "clear",
            CommandKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A night was stopped; the observer should open its quality screen
    NavigateToQuality { night: Night },
    /// A command failed against the store; tracker state is unchanged
    CommandFailed { command: CommandKind, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_view() {
        let view = TrackerView::default();
        assert_eq!(view.state, TrackerState::Idle);
        assert!(view.can_start);
        assert!(!view.can_stop);
        assert!(!view.can_clear);
        assert!(view.summary.is_empty());
    }

    #[test]
    fn test_tracking_view() {
        let mut tonight = Night::begin();
        tonight.id = 3;
        let view = TrackerView::derive(Some(&tonight), std::slice::from_ref(&tonight), None);

        assert_eq!(view.state, TrackerState::Tracking);
        assert!(!view.can_start);
        assert!(view.can_stop);
        assert!(view.can_clear);
        assert!(view.summary.contains("still sleeping"));
    }

    #[test]
    fn test_clear_visibility_follows_list_not_current() {
        let mut done = Night::begin();
        done.finish();
        let view = TrackerView::derive(None, &[done], None);
        assert!(view.can_start);
        assert!(view.can_clear);
    }
}
