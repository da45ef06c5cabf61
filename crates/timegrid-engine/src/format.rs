//! Label formatting strategy.
//!
//! The engine never decides how dates read; it only asks a [`DateFormatter`]
//! for the three labels a week view needs. [`DefaultFormatter`] renders them
//! with chrono format strings taken from the configuration.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::config::WeekViewConfig;

pub trait DateFormatter {
    /// Label above one day column (e.g. "Wed 10").
    fn format_day_header(&self, date: &DateTime<FixedOffset>) -> String;

    /// Title of the whole week, given the window start at local noon.
    fn format_title(&self, date: &DateTime<FixedOffset>) -> String;

    /// Label of one hour-column row.
    fn format_hour_label(&self, date: &DateTime<FixedOffset>) -> String;
}

/// chrono `strftime`-style formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultFormatter {
    pub day_header: String,
    pub title: String,
    pub hour_label: String,
}

impl DefaultFormatter {
    pub fn from_config(config: &WeekViewConfig) -> Self {
        Self {
            day_header: config.format_day_header.clone(),
            title: config.format_title.clone(),
            hour_label: config.format_hour_label.clone(),
        }
    }
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self::from_config(&WeekViewConfig::default())
    }
}

impl DateFormatter for DefaultFormatter {
    fn format_day_header(&self, date: &DateTime<FixedOffset>) -> String {
        render(date, &self.day_header)
    }

    fn format_title(&self, date: &DateTime<FixedOffset>) -> String {
        render(date, &self.title)
    }

    fn format_hour_label(&self, date: &DateTime<FixedOffset>) -> String {
        render(date, &self.hour_label)
    }
}

/// Format `date`, yielding an empty label when chrono rejects `format`.
fn render(date: &DateTime<FixedOffset>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        warn!(format, "unrenderable label format");
        out.clear();
    }
    out
}
