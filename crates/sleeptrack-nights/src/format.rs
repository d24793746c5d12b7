//! Plain-text rendering of the night list shown under the tracker buttons

use chrono::{DateTime, Duration, Utc};
use std::fmt::Write;

use crate::night::Night;

const HEADER: &str = "Here is your sleep data";
const TIME_FORMAT: &str = "%A %b-%d-%Y Time: %H:%M";

/// Render nights (in the order given) as a block of text, one paragraph each.
pub fn format_nights(nights: &[Night]) -> String {
    if nights.is_empty() {
        return String::new();
    }

    let mut out = String::from(HEADER);
    out.push('\n');

    for night in nights {
        out.push('\n');
        // Writing into a String cannot fail
        let _ = writeln!(out, "Start: {}", format_time(night.start_time));

        if night.is_in_progress() {
            out.push_str("End: still sleeping\n");
            continue;
        }

        let _ = writeln!(out, "End: {}", format_time(night.end_time));
        let _ = writeln!(
            out,
            "Quality: {}",
            night.quality.map(|q| q.label()).unwrap_or("--")
        );
        if let Some(note) = &night.note {
            let _ = writeln!(out, "Note: {note}");
        }
        let _ = writeln!(
            out,
            "Hours:Minutes:Seconds {}",
            format_duration(night.duration())
        );
    }

    out
}

/// `H:MM:SS`; negative spans render as zero
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}
