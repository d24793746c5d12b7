//! Night data structure

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::SleepQuality;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Night {
    /// Row id, 0 until the night has been inserted
    pub id: i64,
    /// When tracking started
    pub start_time: DateTime<Utc>,
    /// When tracking stopped; equal to `start_time` while in progress
    pub end_time: DateTime<Utc>,
    /// Rating given after the night was stopped
    pub quality: Option<SleepQuality>,
    /// Free-form note
    pub note: Option<String>,
}

impl Night {
    /// A fresh, unsaved night that starts now and is in progress
    pub fn begin() -> Self {
        Self::begin_at(now_millis())
    }

    pub fn begin_at(start: DateTime<Utc>) -> Self {
        let start = truncate_millis(start);

        Self {
            id: 0,
            start_time: start,
            end_time: start,
            quality: None,
            note: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.end_time == self.start_time
    }

    pub fn is_complete(&self) -> bool {
        !self.is_in_progress()
    }

    /// Stop tracking now
    pub fn finish(&mut self) {
        self.finish_at(now_millis());
    }

    /// Stop tracking at `end`.
    ///
    /// The stored resolution is milliseconds, so an end that does not land
    /// strictly after the start is bumped forward by one millisecond to keep
    /// the night from reading back as in progress.
    pub fn finish_at(&mut self, end: DateTime<Utc>) {
        let end = truncate_millis(end);
        self.end_time = if end > self.start_time {
            end
        } else {
            self.start_time + Duration::milliseconds(1)
        };

        tracing::debug!(
            night_id = self.id,
            end = %self.end_time,
            "Night finished"
        );
    }

    /// Time slept, zero while in progress
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn set_quality(&mut self, quality: SleepQuality) {
        self.quality = Some(quality);
    }

    /// Set or clear the note; blank notes are stored as none
    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
    }
}

fn now_millis() -> DateTime<Utc> {
    truncate_millis(Utc::now())
}

fn truncate_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}
