//! Map raw events onto grid coordinates.
//!
//! Timed events become one [`Fragment`] per touched day, clipped to the
//! displayed hour range and stored in the grid cell of their first row.
//! All-day events become a single banner stored on their first day's
//! [`DateCell`]. Nothing here assigns columns; see [`crate::layout`].

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::config::GridSettings;
use crate::event::CalendarEvent;
use crate::range::{since_local_midnight, TimeRange, DAYS_PER_WEEK};
use crate::view::{DateCell, Fragment, RejectedEvent, SlotCell, WeekView};

/// Slot-units subtracted before rounding an end position up, so an event
/// ending exactly on a row boundary does not spill into the next row.
const END_EPSILON: f64 = 0.016;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// What a projection pass placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Projected {
    pub timed: usize,
    pub all_day: usize,
    pub rejected: usize,
}

/// Clear every cell of `view` and place `view.events` into it.
///
/// Events ending at or before their start are not placed; they are recorded
/// in `view.rejected` instead. Events entirely outside the window are
/// ignored silently.
pub fn project_events(view: &mut WeekView, settings: &GridSettings) -> Projected {
    let WeekView {
        range,
        rows,
        dates,
        events,
        rejected,
    } = view;

    for date in dates.iter_mut() {
        date.events.clear();
        date.has_event = false;
    }
    for cell in rows.iter_mut().flatten() {
        cell.events.clear();
    }
    rejected.clear();

    let mut projected = Projected::default();
    for (source, event) in events.iter().enumerate() {
        if !event.is_well_formed() {
            warn!(
                id = %event.id,
                start = %event.start_time,
                end = %event.end_time,
                "event ends at or before its start, not placed"
            );
            rejected.push(RejectedEvent {
                id: event.id.clone(),
                reason: "end time is not after start time".to_string(),
            });
            projected.rejected += 1;
            continue;
        }

        if event.all_day {
            if project_all_day(source, event, range, dates) {
                projected.all_day += 1;
            }
        } else {
            projected.timed += project_timed(source, event, range, settings, rows, dates);
        }
    }

    debug!(
        timed = projected.timed,
        all_day = projected.all_day,
        rejected = projected.rejected,
        "projected events onto grid"
    );
    projected
}

/// Place one all-day banner. Returns whether it fell inside the window.
fn project_all_day(
    source: usize,
    event: &CalendarEvent,
    range: &TimeRange,
    dates: &mut [DateCell],
) -> bool {
    let (utc_start, utc_end) = range.utc_midnight_bounds();
    if event.end_time <= utc_start || event.start_time >= utc_end {
        return false;
    }

    let start_index = if event.start_time <= utc_start {
        0
    } else {
        (event.start_time - utc_start)
            .num_milliseconds()
            .div_euclid(MILLIS_PER_DAY)
    };
    let end_index = if event.end_time >= utc_end {
        ceil_days((utc_end - utc_start).num_milliseconds())
    } else {
        ceil_days((event.end_time - utc_start).num_milliseconds())
    };

    let last_day = DAYS_PER_WEEK as i64;
    let start = start_index.clamp(0, last_day - 1) as usize;
    let end = end_index.clamp(start as i64 + 1, last_day) as usize;

    let Some(date) = dates.get_mut(start) else {
        return false;
    };
    date.events.push(Fragment::new(source, start, start, end));
    date.has_event = true;
    true
}

/// Place the per-day fragments of one timed event. Returns how many were
/// placed.
fn project_timed(
    source: usize,
    event: &CalendarEvent,
    range: &TimeRange,
    settings: &GridSettings,
    rows: &mut [Vec<SlotCell>],
    dates: &mut [DateCell],
) -> usize {
    if event.end_time <= range.start_time || event.start_time >= range.end_time {
        return 0;
    }

    let rows_per_day = settings.slot.slots_per_day() as i64;
    let slot_minutes = f64::from(settings.slot.minutes());
    // Positions count from the nominal 00:00 of the first day.
    let slot_position = |instant: &DateTime<FixedOffset>| {
        let delta = since_local_midnight(&range.start_time, instant, &settings.tz);
        delta.num_milliseconds() as f64 / 60_000.0 / slot_minutes
    };

    let start_position = if event.start_time <= range.start_time {
        0.0
    } else {
        slot_position(&event.start_time.fixed_offset())
    };
    let end_position = if event.end_time >= range.end_time {
        (rows_per_day * DAYS_PER_WEEK as i64) as f64
    } else {
        slot_position(&event.end_time.fixed_offset())
    };

    let range_start_row = settings.range_start_row() as i64;
    let range_end_row = settings.range_end_row() as i64;
    let hour_parts = f64::from(settings.hour_parts);

    let start_index = start_position.floor() as i64;
    let end_index = (end_position - END_EPSILON).ceil() as i64;

    let mut day = start_index.div_euclid(rows_per_day);
    let mut start_row = start_index.rem_euclid(rows_per_day);
    let mut end_of_day = day * rows_per_day;
    let mut start_offset = if start_row < range_start_row {
        0
    } else {
        part_units((start_position - start_index as f64) * hour_parts)
    };
    let mut end_offset = 0;
    let mut placed = 0;

    loop {
        end_of_day += rows_per_day;
        let last_fragment = end_of_day >= end_index;

        let end_row = if end_of_day > end_index {
            end_index.rem_euclid(rows_per_day)
        } else {
            rows_per_day
        };
        if last_fragment {
            end_offset = if end_row > range_end_row {
                0
            } else {
                part_units((end_index as f64 - end_position) * hour_parts)
            };
        }

        // Rebase onto the displayed rows.
        let first = (start_row - range_start_row).max(0);
        let last = end_row.min(range_end_row) - range_start_row;

        if first < last && (0..DAYS_PER_WEEK as i64).contains(&day) {
            let (first, day) = (first as usize, day as usize);
            let mut fragment = Fragment::new(source, day, first, last as usize);
            fragment.start_offset = start_offset;
            fragment.end_offset = end_offset;

            if let (Some(row), Some(date)) = (rows.get_mut(first), dates.get_mut(day)) {
                if let Some(cell) = row.get_mut(day) {
                    cell.events.push(fragment);
                    date.has_event = true;
                    placed += 1;
                }
            }
        }

        if last_fragment {
            break;
        }
        start_row = 0;
        start_offset = 0;
        day += 1;
    }

    placed
}

/// Round a fractional part count down, never below zero.
fn part_units(parts: f64) -> u32 {
    parts.floor().max(0.0) as u32
}

fn ceil_days(millis: i64) -> i64 {
    (millis + MILLIS_PER_DAY - 1).div_euclid(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SlotSpan, WeekViewConfig};
    use crate::format::DefaultFormatter;
    use crate::grid::{build_date_cells, build_grid};
    use crate::range::get_range;
    use chrono::{TimeZone, Utc, Weekday};
    use chrono_tz::Tz;

    fn utc(d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, min, 0).unwrap()
    }

    fn view_for(settings: &GridSettings, events: Vec<CalendarEvent>) -> WeekView {
        let range = get_range(utc(10, 12, 0), Weekday::Sun, &settings.tz);
        WeekView {
            rows: build_grid(&range.start_time, settings),
            dates: build_date_cells(&range.start_time, 7, &settings.tz, &DefaultFormatter::default()),
            range,
            events,
            rejected: Vec::new(),
        }
    }

    fn settings(config: WeekViewConfig) -> GridSettings {
        config.validate().unwrap()
    }

    fn timed_fragments(view: &WeekView) -> Vec<Fragment> {
        (0..7).flat_map(|d| view.day_fragments(d).cloned()).collect()
    }

    #[test]
    fn test_single_hour_event() {
        let s = settings(WeekViewConfig::default());
        // Wednesday 10:00-11:00 is day 3, row 10
        let mut view = view_for(&s, vec![CalendarEvent::new("a", utc(10, 10, 0), utc(10, 11, 0))]);
        let projected = project_events(&mut view, &s);
        assert_eq!(projected.timed, 1);

        let cell = &view.rows[10][3];
        assert_eq!(cell.events.len(), 1);
        let f = &cell.events[0];
        assert_eq!((f.day_index, f.start_slot, f.end_slot), (3, 10, 11));
        assert_eq!((f.start_offset, f.end_offset), (0, 0));
        assert!(view.dates[3].has_event);
        assert!(!view.dates[2].has_event);
    }

    #[test]
    fn test_sub_slot_offsets() {
        let s = settings(WeekViewConfig {
            hour_parts: 4,
            ..Default::default()
        });
        // 10:15-11:30 → rows 10..12, quarter offsets 1 and 2
        let mut view = view_for(&s, vec![CalendarEvent::new("a", utc(10, 10, 15), utc(10, 11, 30))]);
        project_events(&mut view, &s);
        let f = &view.rows[10][3].events[0];
        assert_eq!((f.start_slot, f.end_slot), (10, 12));
        assert_eq!((f.start_offset, f.end_offset), (1, 2));
    }

    #[test]
    fn test_event_spanning_midnight_splits() {
        let s = settings(WeekViewConfig::default());
        let mut view = view_for(&s, vec![CalendarEvent::new("e", utc(7, 23, 0), utc(8, 1, 0))]);
        let projected = project_events(&mut view, &s);
        assert_eq!(projected.timed, 2);

        let fragments = timed_fragments(&view);
        assert_eq!(fragments.len(), 2);
        assert_eq!((fragments[0].day_index, fragments[0].start_slot, fragments[0].end_slot), (0, 23, 24));
        assert_eq!((fragments[1].day_index, fragments[1].start_slot, fragments[1].end_slot), (1, 0, 1));
        assert!(view.dates[0].has_event && view.dates[1].has_event);
    }

    #[test]
    fn test_multi_day_offsets_only_at_true_ends() {
        let s = settings(WeekViewConfig {
            hour_parts: 2,
            ..Default::default()
        });
        // Mon 22:30 → Wed 01:30
        let mut view = view_for(&s, vec![CalendarEvent::new("m", utc(8, 22, 30), utc(10, 1, 30))]);
        project_events(&mut view, &s);
        let fragments = timed_fragments(&view);
        assert_eq!(fragments.len(), 3);

        assert_eq!((fragments[0].start_slot, fragments[0].end_slot), (22, 24));
        assert_eq!((fragments[0].start_offset, fragments[0].end_offset), (1, 0));
        assert_eq!((fragments[1].start_slot, fragments[1].end_slot), (0, 24));
        assert_eq!((fragments[1].start_offset, fragments[1].end_offset), (0, 0));
        assert_eq!((fragments[2].start_slot, fragments[2].end_slot), (0, 2));
        assert_eq!((fragments[2].start_offset, fragments[2].end_offset), (0, 1));
    }

    #[test]
    fn test_clipped_to_displayed_hours() {
        let s = settings(WeekViewConfig {
            start_hour: 8,
            end_hour: 18,
            hour_parts: 2,
            ..Default::default()
        });
        // 07:30-19:30 clips to the whole displayed range with zero offsets
        let mut view = view_for(&s, vec![CalendarEvent::new("c", utc(9, 7, 30), utc(9, 19, 30))]);
        project_events(&mut view, &s);
        let f = &view.rows[0][2].events[0];
        assert_eq!((f.start_slot, f.end_slot), (0, 10));
        assert_eq!((f.start_offset, f.end_offset), (0, 0));
    }

    #[test]
    fn test_outside_displayed_hours_dropped() {
        let s = settings(WeekViewConfig {
            start_hour: 8,
            end_hour: 18,
            ..Default::default()
        });
        let mut view = view_for(&s, vec![CalendarEvent::new("early", utc(9, 5, 0), utc(9, 7, 0))]);
        let projected = project_events(&mut view, &s);
        assert_eq!(projected.timed, 0);
        assert!(!view.dates[2].has_event);
    }

    #[test]
    fn test_exact_boundary_end_does_not_spill() {
        let s = settings(WeekViewConfig {
            segments_per_hour: SlotSpan::per_hour(2).unwrap(),
            ..Default::default()
        });
        let mut view = view_for(&s, vec![CalendarEvent::new("b", utc(10, 10, 0), utc(10, 10, 30))]);
        project_events(&mut view, &s);
        let f = &view.rows[20][3].events[0];
        assert_eq!((f.start_slot, f.end_slot), (20, 21));
    }

    #[test]
    fn test_aggregated_two_hour_slots() {
        let s = settings(WeekViewConfig {
            segments_per_hour: SlotSpan::hours(2).unwrap(),
            hour_parts: 2,
            ..Default::default()
        });
        // 09:00-12:00 covers rows 4 (08-10, second half) and 5 (10-12)
        let mut view = view_for(&s, vec![CalendarEvent::new("g", utc(10, 9, 0), utc(10, 12, 0))]);
        project_events(&mut view, &s);
        let f = &view.rows[4][3].events[0];
        assert_eq!((f.start_slot, f.end_slot), (4, 6));
        assert_eq!((f.start_offset, f.end_offset), (1, 0));
    }

    #[test]
    fn test_event_clamped_to_window() {
        let s = settings(WeekViewConfig::default());
        // Starts the Saturday before, ends the Monday after
        let mut view = view_for(&s, vec![CalendarEvent::new("w", utc(6, 12, 0), utc(15, 12, 0))]);
        let projected = project_events(&mut view, &s);
        assert_eq!(projected.timed, 7);
        for day in 0..7 {
            let f = &view.rows[0][day].events[0];
            assert_eq!((f.start_slot, f.end_slot), (0, 24));
        }
    }

    #[test]
    fn test_outside_window_ignored() {
        let s = settings(WeekViewConfig::default());
        let mut view = view_for(
            &s,
            vec![
                CalendarEvent::new("before", utc(6, 10, 0), utc(7, 0, 0)),
                CalendarEvent::new("after", utc(14, 0, 0), utc(14, 1, 0)),
            ],
        );
        let projected = project_events(&mut view, &s);
        assert_eq!(projected, Projected::default());
        assert!(view.rejected.is_empty());
    }

    #[test]
    fn test_malformed_event_rejected() {
        let s = settings(WeekViewConfig::default());
        let mut view = view_for(&s, vec![CalendarEvent::new("bad", utc(10, 11, 0), utc(10, 10, 0))]);
        let projected = project_events(&mut view, &s);
        assert_eq!(projected.rejected, 1);
        assert_eq!(view.rejected[0].id, "bad");
        assert!(timed_fragments(&view).is_empty());
    }

    #[test]
    fn test_all_day_within_week() {
        let s = settings(WeekViewConfig::default());
        let mut view = view_for(&s, vec![CalendarEvent::all_day("h", utc(9, 0, 0), utc(11, 0, 0))]);
        let projected = project_events(&mut view, &s);
        assert_eq!(projected.all_day, 1);
        let f = &view.dates[2].events[0];
        assert_eq!((f.day_index, f.start_slot, f.end_slot), (2, 2, 4));
        assert!(view.dates[2].has_event);
        assert!(!view.dates[3].has_event);
    }

    #[test]
    fn test_all_day_covering_window_clips() {
        let s = settings(WeekViewConfig::default());
        let mut view = view_for(&s, vec![CalendarEvent::all_day("v", utc(1, 0, 0), utc(31, 0, 0))]);
        project_events(&mut view, &s);
        let f = &view.dates[0].events[0];
        assert_eq!((f.start_slot, f.end_slot), (0, 7));
    }

    #[test]
    fn test_all_day_uses_utc_midnights_in_other_zone() {
        let s = settings(WeekViewConfig {
            timezone: "America/Los_Angeles".to_string(),
            ..Default::default()
        });
        // Stored as UTC midnight of Wednesday; local window starts Sun 00:00 PST
        let mut view = view_for(&s, vec![CalendarEvent::all_day("u", utc(10, 0, 0), utc(11, 0, 0))]);
        project_events(&mut view, &s);
        let f = &view.dates[3].events[0];
        assert_eq!((f.start_slot, f.end_slot), (3, 4));
    }

    #[test]
    fn test_dst_day_keeps_wall_clock_rows() {
        let s = settings(WeekViewConfig {
            timezone: "America/New_York".to_string(),
            ..Default::default()
        });
        let tz: Tz = "America/New_York".parse().unwrap();
        let range = get_range(Utc.with_ymd_and_hms(2024, 3, 12, 12, 0, 0).unwrap(), Weekday::Sun, &tz);
        // Monday 2024-03-11 09:00-10:00 EDT, after the Sunday spring-forward
        let start = Utc.with_ymd_and_hms(2024, 3, 11, 13, 0, 0).unwrap();
        let mut view = WeekView {
            rows: build_grid(&range.start_time, &s),
            dates: build_date_cells(&range.start_time, 7, &tz, &DefaultFormatter::default()),
            range,
            events: vec![CalendarEvent::new("d", start, start + chrono::Duration::hours(1))],
            rejected: Vec::new(),
        };
        project_events(&mut view, &s);
        let f = &view.rows[9][1].events[0];
        assert_eq!((f.start_slot, f.end_slot), (9, 10));
    }

    #[test]
    fn test_week_starting_in_midnight_gap() {
        // Santiago skipped 2023-09-03 00:00..01:00, so the window opens at 01:00
        let s = settings(WeekViewConfig {
            timezone: "America/Santiago".to_string(),
            ..Default::default()
        });
        let tz: Tz = "America/Santiago".parse().unwrap();
        let range = get_range(Utc.with_ymd_and_hms(2023, 9, 6, 15, 0, 0).unwrap(), Weekday::Sun, &tz);
        // Tue 10:00-11:00 and Sat 23:00 past the end of the window, local -03:00
        let tuesday = Utc.with_ymd_and_hms(2023, 9, 5, 13, 0, 0).unwrap();
        let saturday = Utc.with_ymd_and_hms(2023, 9, 10, 2, 0, 0).unwrap();
        let mut view = WeekView {
            rows: build_grid(&range.start_time, &s),
            dates: build_date_cells(&range.start_time, 7, &tz, &DefaultFormatter::default()),
            range,
            events: vec![
                CalendarEvent::new("t", tuesday, tuesday + chrono::Duration::hours(1)),
                CalendarEvent::new("s", saturday, saturday + chrono::Duration::hours(3)),
            ],
            rejected: Vec::new(),
        };
        project_events(&mut view, &s);

        let cell = &view.rows[10][2];
        assert_eq!(cell.time, tuesday);
        assert_eq!(cell.events.len(), 1);
        assert_eq!((cell.events[0].start_slot, cell.events[0].end_slot), (10, 11));

        let late = &view.rows[23][6].events[0];
        assert_eq!((late.day_index, late.start_slot, late.end_slot), (6, 23, 24));
        assert_eq!(timed_fragments(&view).len(), 2);
    }

    #[test]
    fn test_reprojection_clears_previous_cells() {
        let s = settings(WeekViewConfig::default());
        let mut view = view_for(&s, vec![CalendarEvent::new("a", utc(10, 10, 0), utc(10, 11, 0))]);
        project_events(&mut view, &s);
        view.events.clear();
        project_events(&mut view, &s);
        assert!(timed_fragments(&view).is_empty());
        assert!(!view.dates[3].has_event);
    }
}
