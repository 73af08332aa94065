use chrono::{DateTime, FixedOffset};

use crate::services::occupancy::OccupiedInterval;
use crate::services::schedule_utils::{self, WorkingWindow};

/// Free span inside working hours, at least `min_block_minutes` long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeGap {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl FreeGap {
    pub fn minutes(&self) -> i64 {
        schedule_utils::minutes_between(self.start, self.end)
    }
}

/// Lazy walk over the free time between occupied intervals. Each call to
/// [`enumerate_gaps`] starts a fresh walk; the iterator owns its cursor.
#[derive(Debug, Clone)]
pub struct FreeGaps<'a> {
    occupied: std::slice::Iter<'a, OccupiedInterval>,
    window: WorkingWindow,
    min_minutes: i64,
    cursor: DateTime<FixedOffset>,
    tail_done: bool,
}

/// `occupied` must be sorted by start.
pub fn enumerate_gaps(
    occupied: &[OccupiedInterval],
    window: WorkingWindow,
    min_block_minutes: i64,
) -> FreeGaps<'_> {
    FreeGaps {
        occupied: occupied.iter(),
        window,
        min_minutes: min_block_minutes,
        cursor: window.start,
        tail_done: false,
    }
}

fn clamped_gap(
    window: &WorkingWindow,
    min_minutes: i64,
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
) -> Option<FreeGap> {
    let (start, end) = window.clamp(from, to)?;
    let gap = FreeGap { start, end };
    (gap.minutes() >= min_minutes).then_some(gap)
}

impl Iterator for FreeGaps<'_> {
    type Item = FreeGap;

    fn next(&mut self) -> Option<FreeGap> {
        for interval in self.occupied.by_ref() {
            let candidate =
                clamped_gap(&self.window, self.min_minutes, self.cursor, interval.start);
            self.cursor = self.cursor.max(interval.end);
            if candidate.is_some() {
                return candidate;
            }
        }

        if self.tail_done {
            return None;
        }
        self.tail_done = true;
        clamped_gap(&self.window, self.min_minutes, self.cursor, self.window.end)
    }
}
