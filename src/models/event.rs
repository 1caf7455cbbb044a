use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::schedule::{Status, DATETIME_FORMAT};

/// A scheduled event owned by a single user.
///
/// `status` is derived on every read via `schedule::refresh_statuses`; the
/// value stored in the JSON file is never treated as the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub title: String,
    pub date: String,
    pub time: String,
    // Combined "YYYY-MM-DD HH:MM", rebuilt from date + time on every write
    pub datetime: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub owner_user_id: u64,
    // Denormalized so reminders can still be addressed if the user record
    // becomes unresolvable
    pub owner_email: String,
    #[serde(default)]
    pub reminder_sent: bool,
    #[serde(default)]
    pub status: Status,
}

impl Event {
    /// Combine separate date and time form fields into the canonical
    /// datetime string.
    pub fn combine_datetime(date: &str, time: &str) -> String {
        format!("{} {}", date, time)
    }

    /// Parse the event's start instant. `None` for malformed datetimes.
    pub fn start(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.datetime, DATETIME_FORMAT).ok()
    }
}

/// Parse a free-form duration field, degrading to 0 on anything
/// non-numeric or negative.
pub fn parse_duration_minutes(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_produces_canonical_format() {
        let dt = Event::combine_datetime("2024-01-01", "10:00");
        assert_eq!(dt, "2024-01-01 10:00");
        assert!(NaiveDateTime::parse_from_str(&dt, DATETIME_FORMAT).is_ok());
    }

    #[test]
    fn duration_degrades_to_zero() {
        assert_eq!(parse_duration_minutes("45"), 45);
        assert_eq!(parse_duration_minutes(" 30 "), 30);
        assert_eq!(parse_duration_minutes(""), 0);
        assert_eq!(parse_duration_minutes("abc"), 0);
        assert_eq!(parse_duration_minutes("-5"), 0);
    }
}
