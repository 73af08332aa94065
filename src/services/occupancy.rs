use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

use crate::error::AppResult;
use crate::models::calendar::CalendarEvent;
use crate::services::schedule_utils;

/// Span of a meeting widened by its prep and post buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedInterval {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl OccupiedInterval {
    pub fn minutes(&self) -> i64 {
        schedule_utils::minutes_between(self.start, self.end)
    }
}

/// Buffered intervals of every timed, non-cancelled event, ascending by start.
/// Overlapping intervals are left as they are; see [`coalesce`].
pub fn build_occupancy(
    events: &[CalendarEvent],
    prep_minutes: i64,
    post_minutes: i64,
    tz: Tz,
) -> AppResult<Vec<OccupiedInterval>> {
    let mut occupied = Vec::new();
    for event in events.iter().filter(|event| event.blocks_time()) {
        let start = schedule_utils::parse_event_instant(&event.start, false, tz)?;
        let end = schedule_utils::parse_event_instant(&event.end, false, tz)?;
        schedule_utils::ensure_window(start, end)?;

        occupied.push(OccupiedInterval {
            start: schedule_utils::add_minutes(start, -prep_minutes)?,
            end: schedule_utils::add_minutes(end, post_minutes)?,
        });
    }

    occupied.sort_by_key(|interval| interval.start);
    Ok(occupied)
}

/// Merges overlapping or touching intervals of a start-sorted list, so that
/// every gap between consecutive results is genuinely free.
pub fn coalesce(sorted: &[OccupiedInterval]) -> Vec<OccupiedInterval> {
    let mut merged: Vec<OccupiedInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                if interval.end > last.end {
                    last.end = interval.end;
                }
            }
            _ => merged.push(*interval),
        }
    }
    merged
}

/// Sum of the interval durations as given. Overlapping minutes are counted
/// once per interval; callers that need covered time should [`coalesce`] first.
pub fn occupied_minutes(intervals: &[OccupiedInterval]) -> i64 {
    intervals.iter().map(OccupiedInterval::minutes).sum()
}
