//! The 7-day window displayed by a week view.
//!
//! All boundaries are local midnights in the configured timezone. Day and
//! slot arithmetic elsewhere in the crate goes through
//! [`since_local_midnight`], which subtracts local wall-clock readings rather
//! than absolute instants, so that a 23- or 25-hour DST day still maps onto
//! exactly one grid day.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset,
    TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, TimegridError};

pub const DAYS_PER_WEEK: usize = 7;

/// Half-open window `[start_time, end_time)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
}

impl TimeRange {
    /// UTC midnights of the local calendar dates of both bounds.
    ///
    /// All-day events are stored as UTC-midnight instants regardless of the
    /// viewer's zone, so they are compared against these instead of the
    /// local boundaries.
    pub fn utc_midnight_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            utc_midnight(self.start_time.date_naive()),
            utc_midnight(self.end_time.date_naive()),
        )
    }
}

/// Compute the week containing `anchor`.
///
/// `start_time` is the most recent local midnight on or before `anchor`
/// whose weekday is `week_start`; `end_time` is the local midnight seven
/// calendar days later.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc, Weekday};
/// use chrono_tz::Tz;
/// use timegrid_engine::range::get_range;
///
/// let anchor = Utc.with_ymd_and_hms(2024, 1, 10, 15, 30, 0).unwrap(); // Wednesday
/// let range = get_range(anchor, Weekday::Sun, &Tz::UTC);
/// assert_eq!(range.start_time.to_rfc3339(), "2024-01-07T00:00:00+00:00");
/// assert_eq!(range.end_time.to_rfc3339(), "2024-01-14T00:00:00+00:00");
/// ```
pub fn get_range(anchor: DateTime<Utc>, week_start: Weekday, tz: &Tz) -> TimeRange {
    let date = anchor.with_timezone(tz).date_naive();
    let first = date - Duration::days(days_from_week_start(date.weekday(), week_start));

    TimeRange {
        start_time: local_midnight(tz, first).fixed_offset(),
        end_time: local_midnight(tz, first + Duration::days(DAYS_PER_WEEK as i64)).fixed_offset(),
    }
}

/// How many days `weekday` is past the week-start day.
pub fn days_from_week_start(weekday: Weekday, week_start: Weekday) -> i64 {
    let day = weekday.num_days_from_sunday() as i64;
    let start = week_start.num_days_from_sunday() as i64;
    (day - start).rem_euclid(7)
}

/// Wall-clock time elapsed from `from` to `to`, both read in `tz`.
///
/// Equals the absolute difference corrected by the change in UTC offset
/// between the two instants.
pub fn wall_clock_delta<A, B>(from: &DateTime<A>, to: &DateTime<B>, tz: &Tz) -> Duration
where
    A: TimeZone,
    B: TimeZone,
{
    to.with_timezone(tz).naive_local() - from.with_timezone(tz).naive_local()
}

/// Wall-clock time from the start of `from`'s local calendar day to `to`.
///
/// Measured from the nominal `00:00` reading, so a day whose midnight falls
/// in a DST gap still starts at zero.
pub fn since_local_midnight<A, B>(from: &DateTime<A>, to: &DateTime<B>, tz: &Tz) -> Duration
where
    A: TimeZone,
    B: TimeZone,
{
    let origin = from
        .with_timezone(tz)
        .date_naive()
        .and_time(chrono::NaiveTime::MIN);
    to.with_timezone(tz).naive_local() - origin
}

/// Whole wall-clock days from the local day of `from` to `to` (floored).
pub fn day_offset<A, B>(from: &DateTime<A>, to: &DateTime<B>, tz: &Tz) -> i64
where
    A: TimeZone,
    B: TimeZone,
{
    let delta = since_local_midnight(from, to, tz);
    delta
        .num_milliseconds()
        .div_euclid(Duration::days(1).num_milliseconds())
}

/// Local midnight of `date` in `tz`.
pub fn local_midnight(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    resolve_local(tz, date.and_time(chrono::NaiveTime::MIN))
}

/// Map a local wall-clock reading to an instant, never failing.
///
/// An ambiguous reading (DST fall-back) resolves to the earlier instant. A
/// reading inside a DST gap resolves to the first instant after the gap.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Read the wall time with the offset in force before the gap.
            let before = tz
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix();
            let utc = naive - Duration::seconds(i64::from(before.local_minus_utc()));
            Utc.from_utc_datetime(&utc).with_timezone(tz)
        }
    }
}

/// Parse an anchor given as RFC 3339 or as a bare `YYYY-MM-DD` date.
///
/// A bare date means local noon of that day in `tz`.
///
/// # Errors
///
/// Returns [`TimegridError::InvalidDatetime`] when neither form matches.
pub fn parse_anchor(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|date| {
            let noon = date.and_time(chrono::NaiveTime::MIN) + Duration::hours(12);
            resolve_local(tz, noon).with_timezone(&Utc)
        })
        .map_err(|e| TimegridError::InvalidDatetime(format!("'{}': {}", input, e)))
}

fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
