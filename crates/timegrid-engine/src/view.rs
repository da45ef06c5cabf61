//! The snapshot handed to renderers.
//!
//! A [`WeekView`] is built from scratch on every recompute and never patched
//! in place. Fragments refer to their source event by index into the
//! snapshot's own `events` list, so a snapshot stays self-contained.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::event::CalendarEvent;
use crate::range::TimeRange;

/// The part of one event placed within a single day, or a whole all-day
/// banner.
///
/// For timed fragments `start_slot..end_slot` are displayed row indices and
/// the offsets are in units of `1 / hour_parts` of a row. For all-day
/// banners they are day indices within the window and the offsets are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// Index into [`WeekView::events`].
    pub source: usize,
    pub day_index: usize,
    pub start_slot: usize,
    pub end_slot: usize,
    pub start_offset: u32,
    pub end_offset: u32,
    pub column: usize,
    /// Columns used by this fragment's connected overlap cluster. Banners
    /// are never width-divided and always report 1.
    pub cluster_width: usize,
}

impl Fragment {
    /// An unplaced fragment with zero offsets in column 0.
    pub fn new(source: usize, day_index: usize, start_slot: usize, end_slot: usize) -> Self {
        Self {
            source,
            day_index,
            start_slot,
            end_slot,
            start_offset: 0,
            end_offset: 0,
            column: 0,
            cluster_width: 1,
        }
    }

    /// Share of the day column this fragment occupies.
    pub fn rendered_width(&self) -> f64 {
        1.0 / self.cluster_width.max(1) as f64
    }

    /// Horizontal start within the day column, as a share of its width.
    pub fn rendered_left(&self) -> f64 {
        self.column as f64 * self.rendered_width()
    }
}

/// One cell of the time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCell {
    /// Instant at which this row starts on this day.
    pub time: DateTime<FixedOffset>,
    /// Fragments whose first displayed row is this one.
    pub events: Vec<Fragment>,
}

/// One day column header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateCell {
    /// Local noon of the day.
    pub date: DateTime<FixedOffset>,
    pub day_header: String,
    /// All-day banners starting on this day.
    pub events: Vec<Fragment>,
    pub selected: bool,
    pub current: bool,
    pub has_event: bool,
}

/// Visual state flags of a [`DateCell`], in the order renderers apply them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Highlight {
    WithEvent,
    Selected,
    Current,
}

impl DateCell {
    pub fn highlight(&self) -> Vec<Highlight> {
        let mut flags = Vec::new();
        if self.has_event {
            flags.push(Highlight::WithEvent);
        }
        if self.selected {
            flags.push(Highlight::Selected);
        }
        if self.current {
            flags.push(Highlight::Current);
        }
        flags
    }
}

/// An event excluded from placement because it cannot be laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEvent {
    pub id: String,
    pub reason: String,
}

/// Complete layout of one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekView {
    pub range: TimeRange,
    /// `rows[r][d]` is row `r` of day `d`.
    pub rows: Vec<Vec<SlotCell>>,
    pub dates: Vec<DateCell>,
    pub events: Vec<CalendarEvent>,
    pub rejected: Vec<RejectedEvent>,
}

impl WeekView {
    /// Source event of a fragment.
    pub fn event(&self, fragment: &Fragment) -> Option<&CalendarEvent> {
        self.events.get(fragment.source)
    }

    /// Every timed fragment of one day, in row order.
    pub fn day_fragments(&self, day: usize) -> impl Iterator<Item = &Fragment> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(day))
            .flat_map(|cell| cell.events.iter())
    }

    /// Every all-day banner of the week, in start-day order.
    pub fn all_day_fragments(&self) -> impl Iterator<Item = &Fragment> + '_ {
        self.dates.iter().flat_map(|date| date.events.iter())
    }

    pub fn selected_date(&self) -> Option<&DateCell> {
        self.dates.iter().find(|date| date.selected)
    }

    /// Source events of the given fragments, in fragment order.
    pub fn source_events(&self, fragments: &[Fragment]) -> Vec<CalendarEvent> {
        fragments
            .iter()
            .filter_map(|fragment| self.event(fragment).cloned())
            .collect()
    }
}
