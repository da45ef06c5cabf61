//! View configuration.
//!
//! [`WeekViewConfig`] is the loosely-typed, serde-friendly shape that callers
//! fill in (every field has a default). [`WeekViewConfig::validate`] turns it
//! into [`GridSettings`], the checked form every other module works with.

use chrono::format::{Item, StrftimeItems};
use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimegridError};

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

// ── Slot granularity ────────────────────────────────────────────────────────

/// The length of one grid row.
///
/// Expressed externally as "segments per hour": `2` means 30-minute rows,
/// `0.5` means one row per two whole hours. Only values that tile an hour
/// (or a day, for multi-hour rows) exactly are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SlotSpan {
    minutes: u32,
}

impl SlotSpan {
    /// `segments` rows per hour. `segments` must divide 60.
    pub fn per_hour(segments: u32) -> Result<Self> {
        if segments == 0 || MINUTES_PER_HOUR % segments != 0 {
            return Err(TimegridError::InvalidGranularity(format!(
                "{segments} segments per hour do not divide an hour evenly"
            )));
        }
        Ok(Self {
            minutes: MINUTES_PER_HOUR / segments,
        })
    }

    /// One row per `hours` whole hours. `hours` must divide 24.
    pub fn hours(hours: u32) -> Result<Self> {
        if hours == 0 || 24 % hours != 0 {
            return Err(TimegridError::InvalidGranularity(format!(
                "{hours}-hour slots do not divide a day evenly"
            )));
        }
        Ok(Self {
            minutes: hours * MINUTES_PER_HOUR,
        })
    }

    /// Parse the fractional "segments per hour" form (`4`, `1`, `0.5`, `0.25`).
    pub fn from_segments_per_hour(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(TimegridError::InvalidGranularity(format!(
                "segments per hour must be positive, got {value}"
            )));
        }
        if value >= 1.0 {
            if value.fract() != 0.0 {
                return Err(TimegridError::InvalidGranularity(format!(
                    "segments per hour above 1 must be whole, got {value}"
                )));
            }
            return Self::per_hour(value as u32);
        }
        let hours = (1.0 / value).round();
        if (hours * value - 1.0).abs() > 1e-9 {
            return Err(TimegridError::InvalidGranularity(format!(
                "segments per hour below 1 must be the reciprocal of a whole number of hours, got {value}"
            )));
        }
        Self::hours(hours as u32)
    }

    /// Row length in minutes.
    pub fn minutes(self) -> u32 {
        self.minutes
    }

    pub fn segments_per_hour(self) -> f64 {
        f64::from(MINUTES_PER_HOUR) / f64::from(self.minutes)
    }

    /// Rows in a full 24-hour day.
    pub fn slots_per_day(self) -> usize {
        (MINUTES_PER_DAY / self.minutes) as usize
    }

    /// `(hour_step, minute_step)` used to walk the rows of a day.
    pub(crate) fn steps(self) -> (u32, u32) {
        if self.minutes >= MINUTES_PER_HOUR {
            (self.minutes / MINUTES_PER_HOUR, MINUTES_PER_HOUR)
        } else {
            (1, self.minutes)
        }
    }
}

impl Default for SlotSpan {
    fn default() -> Self {
        Self {
            minutes: MINUTES_PER_HOUR,
        }
    }
}

impl TryFrom<f64> for SlotSpan {
    type Error = TimegridError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_segments_per_hour(value)
    }
}

impl From<SlotSpan> for f64 {
    fn from(span: SlotSpan) -> f64 {
        span.segments_per_hour()
    }
}

// ── Layout direction ────────────────────────────────────────────────────────

/// Horizontal direction in which overlap columns are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

// ── WeekViewConfig ──────────────────────────────────────────────────────────

/// Caller-facing configuration. Missing fields fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekViewConfig {
    /// First displayed hour (inclusive), 0–23.
    pub start_hour: u32,
    /// Last displayed hour (exclusive), 1–24.
    pub end_hour: u32,
    /// Rows per hour; below 1 aggregates whole hours into one row.
    pub segments_per_hour: SlotSpan,
    /// Sub-divisions of a row used for offsets and overlap precision.
    pub hour_parts: u32,
    /// 0 = Sunday … 6 = Saturday.
    pub start_of_week_day: u8,
    pub direction: Direction,
    /// Mark the anchor date as selected whenever the view is rebuilt.
    pub auto_select: bool,
    /// IANA timezone the grid is laid out in.
    pub timezone: String,
    /// chrono format string for the per-day column header.
    pub format_day_header: String,
    /// chrono format string for the view title.
    pub format_title: String,
    /// chrono format string for the hour column labels.
    pub format_hour_label: String,
}

impl Default for WeekViewConfig {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 24,
            segments_per_hour: SlotSpan::default(),
            hour_parts: 1,
            start_of_week_day: 0,
            direction: Direction::Ltr,
            auto_select: true,
            timezone: "UTC".to_string(),
            format_day_header: "%a %-d".to_string(),
            format_title: "%B %Y, Week %V".to_string(),
            format_hour_label: "%-I%p".to_string(),
        }
    }
}

impl WeekViewConfig {
    /// Check every field and produce the [`GridSettings`] used by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`TimegridError::InvalidTimezone`] for an unknown IANA name,
    /// [`TimegridError::InvalidWeekStart`] for a day index above 6,
    /// [`TimegridError::InvalidHourRange`] when the hour range is empty or
    /// exceeds a day, [`TimegridError::InvalidHourParts`] for zero parts or
    /// parts shorter than a minute, [`TimegridError::InvalidGranularity`]
    /// when the hour range does not fall on slot boundaries, and
    /// [`TimegridError::InvalidFormat`] for an unparseable label format.
    pub fn validate(&self) -> Result<GridSettings> {
        let tz = parse_timezone(&self.timezone)?;
        let week_start = weekday_from_index(self.start_of_week_day)?;

        if self.end_hour > 24 || self.start_hour >= self.end_hour {
            return Err(TimegridError::InvalidHourRange(format!(
                "start hour {} must be before end hour {} and end hour at most 24",
                self.start_hour, self.end_hour
            )));
        }
        if self.hour_parts == 0 {
            return Err(TimegridError::InvalidHourParts(
                "hour parts must be at least 1".to_string(),
            ));
        }

        let slot = self.segments_per_hour;
        // A part may not be shorter than one minute.
        if self.hour_parts > slot.minutes() {
            return Err(TimegridError::InvalidHourParts(format!(
                "{} parts exceed the {} minutes of one slot",
                self.hour_parts,
                slot.minutes()
            )));
        }
        let start_minutes = self.start_hour * MINUTES_PER_HOUR;
        let end_minutes = self.end_hour * MINUTES_PER_HOUR;
        if start_minutes % slot.minutes() != 0 || end_minutes % slot.minutes() != 0 {
            return Err(TimegridError::InvalidGranularity(format!(
                "hour range {}..{} is not aligned to {}-minute slots",
                self.start_hour,
                self.end_hour,
                slot.minutes()
            )));
        }

        check_format("format_day_header", &self.format_day_header)?;
        check_format("format_title", &self.format_title)?;
        check_format("format_hour_label", &self.format_hour_label)?;

        Ok(GridSettings {
            start_hour: self.start_hour,
            end_hour: self.end_hour,
            slot,
            hour_parts: self.hour_parts,
            week_start,
            direction: self.direction,
            auto_select: self.auto_select,
            tz,
        })
    }
}

// ── GridSettings ────────────────────────────────────────────────────────────

/// Validated configuration shared by the range, grid, projection and layout
/// passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub start_hour: u32,
    pub end_hour: u32,
    pub slot: SlotSpan,
    pub hour_parts: u32,
    pub week_start: Weekday,
    pub direction: Direction,
    pub auto_select: bool,
    pub tz: Tz,
}

impl GridSettings {
    /// Number of displayed rows.
    pub fn rows(&self) -> usize {
        self.range_end_row() - self.range_start_row()
    }

    /// Row index (within a full day) of the first displayed row.
    pub fn range_start_row(&self) -> usize {
        (self.start_hour * MINUTES_PER_HOUR / self.slot.minutes()) as usize
    }

    /// Row index (within a full day) one past the last displayed row.
    pub fn range_end_row(&self) -> usize {
        (self.end_hour * MINUTES_PER_HOUR / self.slot.minutes()) as usize
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 24,
            slot: SlotSpan::default(),
            hour_parts: 1,
            week_start: Weekday::Sun,
            direction: Direction::Ltr,
            auto_select: true,
            tz: Tz::UTC,
        }
    }
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// Parse an IANA timezone string into `Tz`.
fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| TimegridError::InvalidTimezone(format!("'{}'", s)))
}

/// Reject strftime strings chrono cannot render.
fn check_format(field: &str, format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(TimegridError::InvalidFormat(format!("{field} '{format}'")));
    }
    Ok(())
}

/// Map a 0 = Sunday day index onto `Weekday`.
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        _ => Err(TimegridError::InvalidWeekStart(format!(
            "day index {index} is outside 0..=6"
        ))),
    }
}
