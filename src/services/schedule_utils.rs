use chrono::{
    offset::LocalResult, DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone,
};
use chrono_tz::Tz;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::settings::ResolvedSettings;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_datetime(value: &str) -> AppResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|err| {
        AppError::invalid_input_with_details(
            "invalid timestamp",
            json!({"value": value, "error": err.to_string()}),
        )
    })
}

pub fn format_datetime(dt: DateTime<FixedOffset>) -> String {
    dt.to_rfc3339()
}

/// Parses `YYYY-MM-DD`, or the date part of an ISO timestamp.
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|err| {
        AppError::invalid_input_with_details(
            "invalid calendar date",
            json!({"value": value, "error": err.to_string()}),
        )
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Resolves a wall-clock time on `date` in `tz` to an absolute instant.
pub fn local_datetime(
    date: NaiveDate,
    time: NaiveTime,
    tz: Tz,
) -> AppResult<DateTime<FixedOffset>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.fixed_offset()),
        LocalResult::Ambiguous(first, _) => Ok(first.fixed_offset()),
        LocalResult::None => Err(AppError::invalid_input_with_details(
            "local time does not exist in timezone",
            json!({"date": format_date(date), "time": time.to_string(), "timezone": tz.name()}),
        )),
    }
}

/// Event boundaries are RFC 3339 timestamps; all-day events may instead carry
/// a bare date, read as local midnight.
pub fn parse_event_instant(value: &str, all_day: bool, tz: Tz) -> AppResult<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    if all_day && trimmed.len() == 10 {
        let date = parse_date(trimmed)?;
        return local_datetime(date, NaiveTime::MIN, tz);
    }
    parse_datetime(trimmed)
}

pub fn add_minutes(dt: DateTime<FixedOffset>, minutes: i64) -> AppResult<DateTime<FixedOffset>> {
    dt.checked_add_signed(Duration::minutes(minutes))
        .ok_or_else(|| AppError::invalid_input("time arithmetic out of range"))
}

pub fn duration_minutes(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> AppResult<i64> {
    let total = end.signed_duration_since(start).num_minutes();
    if total < 0 {
        Err(AppError::invalid_input("end must not precede start"))
    } else {
        Ok(total)
    }
}

/// Whole minutes from `start` to `end`, zero when `end` precedes `start`.
pub fn minutes_between(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> i64 {
    end.signed_duration_since(start).num_minutes().max(0)
}

pub fn ensure_window(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> AppResult<()> {
    if end <= start {
        Err(AppError::invalid_input_with_details(
            "time window must end after it starts",
            json!({"start": format_datetime(start), "end": format_datetime(end)}),
        ))
    } else {
        Ok(())
    }
}

pub fn overlaps(
    a_start: DateTime<FixedOffset>,
    a_end: DateTime<FixedOffset>,
    b_start: DateTime<FixedOffset>,
    b_end: DateTime<FixedOffset>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Working hours of the plan's day as absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl WorkingWindow {
    pub fn for_day(date: NaiveDate, settings: &ResolvedSettings) -> AppResult<Self> {
        let start = local_datetime(date, settings.workday_start, settings.timezone)?;
        let end = local_datetime(date, settings.workday_end, settings.timezone)?;
        ensure_window(start, end)?;
        Ok(Self { start, end })
    }

    pub fn minutes(&self) -> i64 {
        minutes_between(self.start, self.end)
    }

    /// Intersects `[from, to)` with the window; `None` when nothing remains.
    pub fn clamp(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let start = from.max(self.start);
        let end = to.min(self.end);
        if end <= start {
            None
        } else {
            Some((start, end))
        }
    }

    pub fn contains(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        self.start <= start && end <= self.end
    }
}
