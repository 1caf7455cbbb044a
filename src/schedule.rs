use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::Event;

/// Canonical datetime format for stored events.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Temporal status of an event relative to some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Status {
    Now,
    Upcoming,
    Later,
    Past,
    // Placeholder until the first refresh; also the label for events whose
    // datetime string cannot be parsed
    #[serde(rename = "Invalid Date")]
    #[default]
    InvalidDate,
}

impl Status {
    // Sort rank: Now -> Upcoming -> Later -> Past -> everything else
    pub fn rank(self) -> u8 {
        match self {
            Status::Now => 0,
            Status::Upcoming => 1,
            Status::Later => 2,
            Status::Past => 3,
            Status::InvalidDate => 4,
        }
    }
}

/// Classify an event's datetime string against `now`.
///
/// Total and deterministic: malformed input degrades to
/// [`Status::InvalidDate`] instead of failing the caller. The end instant
/// (`start + duration`) is inclusive, so an event is still `Now` at the
/// exact minute it ends.
pub fn classify(datetime: &str, duration_minutes: u32, now: NaiveDateTime) -> Status {
    let start = match NaiveDateTime::parse_from_str(datetime, DATETIME_FORMAT) {
        Ok(dt) => dt,
        Err(_) => return Status::InvalidDate,
    };

    let end = start + Duration::minutes(duration_minutes as i64);

    if start <= now && now <= end {
        Status::Now
    } else if now < start && start.date() == now.date() {
        Status::Upcoming
    } else if now < start {
        Status::Later
    } else {
        Status::Past
    }
}

/// Recompute the derived `status` field of every event against `now`.
///
/// Kept separate from [`sort_by_schedule`] so ordering stays a pure
/// function of already-derived data.
pub fn refresh_statuses(events: &mut [Event], now: NaiveDateTime) {
    for event in events.iter_mut() {
        event.status = classify(&event.datetime, event.duration_minutes, now);
    }
}

/// Stable sort ascending by (status rank, start time).
///
/// Events with an unparseable datetime sort after all valid ones within
/// their rank bucket. Assumes statuses were refreshed first.
pub fn sort_by_schedule(events: &mut [Event]) {
    events.sort_by_key(|e| (e.status.rank(), e.start().unwrap_or(NaiveDateTime::MAX)));
}
