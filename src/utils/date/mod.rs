// Date utility functions
// Display helpers for the countdown target

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

/// Render an instant as wall-clock time in `zone`, e.g.
/// `25 Aug 2025, 12:00:00 AM IST`.
pub fn format_in_zone<Tz2: TimeZone>(instant: &DateTime<Tz2>, zone: Tz) -> String {
    instant
        .with_timezone(&zone)
        .format("%d %b %Y, %I:%M:%S %p %Z")
        .to_string()
}
