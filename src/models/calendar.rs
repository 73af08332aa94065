use serde::{Deserialize, Serialize};

/// Calendar entry supplied by the calendar connector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date for all-day events.
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub status: EventStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

impl CalendarEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }

    /// Timed, non-cancelled events are the only ones that occupy working time.
    pub fn blocks_time(&self) -> bool {
        !self.all_day && !self.is_cancelled()
    }
}
