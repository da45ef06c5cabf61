//! Empty grid skeletons: time-slot rows × day columns, and the day headers.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::config::GridSettings;
use crate::format::DateFormatter;
use crate::range::{resolve_local, DAYS_PER_WEEK};
use crate::view::{DateCell, SlotCell};

/// Build the displayed rows of a week starting at `start_time`.
///
/// Row `r`, column `d` carries the local instant at which that row begins on
/// day `d`. Rows run from `start_hour` up to (not including) `end_hour`,
/// stepping by the configured slot length; multi-hour slots start on whole
/// hours.
pub fn build_grid(start_time: &DateTime<FixedOffset>, settings: &GridSettings) -> Vec<Vec<SlotCell>> {
    let first_day = start_time.with_timezone(&settings.tz).date_naive();
    let (hour_step, minute_step) = settings.slot.steps();

    let mut rows = Vec::with_capacity(settings.rows());
    for hour in (settings.start_hour..settings.end_hour).step_by(hour_step as usize) {
        for minute in (0..60).step_by(minute_step as usize) {
            let row = (0..DAYS_PER_WEEK)
                .map(|day| SlotCell {
                    time: local_at(&settings.tz, first_day + Duration::days(day as i64), hour, minute),
                    events: Vec::new(),
                })
                .collect();
            rows.push(row);
        }
    }
    rows
}

/// Build `n` day headers starting at the day of `start_time`.
///
/// Each cell's `date` is local noon, which is never skipped or repeated by
/// a DST transition.
pub fn build_date_cells(
    start_time: &DateTime<FixedOffset>,
    n: usize,
    tz: &Tz,
    formatter: &dyn DateFormatter,
) -> Vec<DateCell> {
    let first_day = start_time.with_timezone(tz).date_naive();
    (0..n)
        .map(|i| {
            let date = local_at(tz, first_day + Duration::days(i as i64), 12, 0);
            DateCell {
                day_header: formatter.format_day_header(&date),
                date,
                events: Vec::new(),
                selected: false,
                current: false,
                has_event: false,
            }
        })
        .collect()
}

fn local_at(tz: &Tz, date: NaiveDate, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(hour * 60 + minute));
    resolve_local(tz, naive).fixed_offset()
}
