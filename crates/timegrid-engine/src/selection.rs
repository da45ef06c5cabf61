//! "Today" and "selected day" tracking on a built view.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::GridSettings;
use crate::event::CalendarEvent;
use crate::range::{day_offset, DAYS_PER_WEEK};
use crate::view::{DateCell, Fragment, WeekView};

/// Payload emitted when a day or a time slot is picked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSelected {
    pub selected_time: DateTime<FixedOffset>,
    pub events: Vec<CalendarEvent>,
    pub disabled: bool,
}

/// Predicate marking dates the user may not pick.
pub type DisabledPredicate = dyn Fn(&DateTime<FixedOffset>) -> bool;

/// Recompute the `selected` and `current` flags of `view`.
///
/// `current` marks the day containing `today`; `selected` marks the day
/// containing `anchor`, and only when `auto_select` is on. Days are counted
/// in wall-clock time from `window_start`, so DST transitions inside the
/// window do not shift them.
pub fn update_current_view(
    window_start: &DateTime<FixedOffset>,
    view: &mut WeekView,
    anchor: &DateTime<Utc>,
    today: &DateTime<Utc>,
    settings: &GridSettings,
) {
    for date in view.dates.iter_mut() {
        date.selected = false;
        date.current = false;
    }

    if settings.auto_select {
        if let Some(date) = date_at(view, window_start, anchor, &settings.tz) {
            date.selected = true;
        }
    }
    if let Some(date) = date_at(view, window_start, today, &settings.tz) {
        date.current = true;
    }
}

/// Mark `date` as the only selected day and build the selection payload
/// from that day's all-day banners.
pub fn select_day(
    view: &mut WeekView,
    date: &DateTime<FixedOffset>,
    tz: &Tz,
    is_disabled: Option<&DisabledPredicate>,
) -> TimeSelected {
    let window_start = view.range.start_time;
    for cell in view.dates.iter_mut() {
        cell.selected = false;
    }

    let events = match date_at(view, &window_start, date, tz) {
        Some(cell) => {
            cell.selected = true;
            cell.events.clone()
        }
        None => Vec::new(),
    };

    time_selected(view, *date, &events, is_disabled)
}

/// Build a selection payload for `fragments` at `selected_time`.
pub fn time_selected(
    view: &WeekView,
    selected_time: DateTime<FixedOffset>,
    fragments: &[Fragment],
    is_disabled: Option<&DisabledPredicate>,
) -> TimeSelected {
    TimeSelected {
        disabled: is_disabled.is_some_and(|predicate| predicate(&selected_time)),
        events: view.source_events(fragments),
        selected_time,
    }
}

fn date_at<'a, T: TimeZone>(
    view: &'a mut WeekView,
    window_start: &DateTime<FixedOffset>,
    instant: &DateTime<T>,
    tz: &Tz,
) -> Option<&'a mut DateCell> {
    let offset = day_offset(window_start, instant, tz);
    if (0..DAYS_PER_WEEK as i64).contains(&offset) {
        view.dates.get_mut(offset as usize)
    } else {
        None
    }
}
