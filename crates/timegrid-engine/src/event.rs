//! Raw calendar events as supplied by the event source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source event. The engine never mutates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// All-day events are compared against UTC-midnight day boundaries and
    /// rendered as banners above the time grid.
    #[serde(default)]
    pub all_day: bool,
}

impl CalendarEvent {
    pub fn new(id: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            start_time,
            end_time,
            all_day: false,
        }
    }

    pub fn all_day(id: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            all_day: true,
            ..Self::new(id, start_time, end_time)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// `true` when the event has a positive duration.
    pub fn is_well_formed(&self) -> bool {
        self.end_time > self.start_time
    }
}
