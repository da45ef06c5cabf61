//! Recompute driver and notification fan-out.
//!
//! [`WeekViewController`] owns the anchor date and the event source. Every
//! trigger (anchor change, event-source replacement, navigation) rebuilds a
//! complete [`WeekView`] through [`build_week_view`], swaps it in, and only
//! then notifies the [`WeekViewObserver`].

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::{debug, info};

use crate::config::{GridSettings, WeekViewConfig};
use crate::error::{Result, TimegridError};
use crate::event::CalendarEvent;
use crate::format::{DateFormatter, DefaultFormatter};
use crate::grid::{build_date_cells, build_grid};
use crate::layout::layout_view;
use crate::projector::project_events;
use crate::range::{get_range, resolve_local, TimeRange, DAYS_PER_WEEK};
use crate::selection::{select_day, time_selected, update_current_view, DisabledPredicate, TimeSelected};
use crate::view::{Fragment, WeekView};

// ── Collaborators ───────────────────────────────────────────────────────────

/// Source of "now", used to mark today's column.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the OS clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Receives notifications after each recompute. All methods default to
/// no-ops.
pub trait WeekViewObserver {
    fn range_changed(&mut self, _range: &TimeRange) {}
    fn title_changed(&mut self, _title: &str) {}
    fn time_selected(&mut self, _selection: &TimeSelected) {}
    fn event_selected(&mut self, _event: &CalendarEvent) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl WeekViewObserver for NoopObserver {}

// ── Navigation ──────────────────────────────────────────────────────────────

/// One navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Backward,
    Stay,
    Forward,
}

impl MoveDirection {
    fn weeks(self) -> i64 {
        match self {
            MoveDirection::Backward => -1,
            MoveDirection::Stay => 0,
            MoveDirection::Forward => 1,
        }
    }
}

impl TryFrom<i32> for MoveDirection {
    type Error = TimegridError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(MoveDirection::Backward),
            0 => Ok(MoveDirection::Stay),
            1 => Ok(MoveDirection::Forward),
            other => Err(TimegridError::InvalidDirection(format!(
                "expected -1, 0 or 1, got {other}"
            ))),
        }
    }
}

// ── Snapshot construction ───────────────────────────────────────────────────

/// Build the complete week containing `anchor`.
///
/// Runs the whole pipeline: window, empty grid and day headers, projection,
/// overlap layout, then the today/selected flags.
pub fn build_week_view(
    anchor: DateTime<Utc>,
    events: &[CalendarEvent],
    settings: &GridSettings,
    formatter: &dyn DateFormatter,
    today: DateTime<Utc>,
) -> WeekView {
    let range = get_range(anchor, settings.week_start, &settings.tz);
    let mut view = WeekView {
        rows: build_grid(&range.start_time, settings),
        dates: build_date_cells(&range.start_time, DAYS_PER_WEEK, &settings.tz, formatter),
        range,
        events: events.to_vec(),
        rejected: Vec::new(),
    };

    project_events(&mut view, settings);
    layout_view(&mut view, settings);
    update_current_view(&range.start_time, &mut view, &anchor, &today, settings);
    view
}

// ── Controller ──────────────────────────────────────────────────────────────

/// Builder for [`WeekViewController`]. Unset collaborators fall back to
/// [`DefaultFormatter`], [`SystemClock`], [`NoopObserver`] and "nothing is
/// disabled".
pub struct WeekViewBuilder {
    config: WeekViewConfig,
    anchor: DateTime<Utc>,
    events: Vec<CalendarEvent>,
    formatter: Option<Box<dyn DateFormatter>>,
    is_disabled: Option<Box<DisabledPredicate>>,
    clock: Option<Box<dyn Clock>>,
    observer: Option<Box<dyn WeekViewObserver>>,
}

impl WeekViewBuilder {
    pub fn events(mut self, events: Vec<CalendarEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn formatter(mut self, formatter: impl DateFormatter + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    pub fn is_date_disabled(mut self, predicate: impl Fn(&DateTime<FixedOffset>) -> bool + 'static) -> Self {
        self.is_disabled = Some(Box::new(predicate));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn observer(mut self, observer: impl WeekViewObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Validate the configuration and run the first refresh.
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`WeekViewConfig::validate`].
    pub fn build(self) -> Result<WeekViewController> {
        let settings = self.config.validate()?;
        let formatter = self
            .formatter
            .unwrap_or_else(|| Box::new(DefaultFormatter::from_config(&self.config)));
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        let today = clock.now();
        let view = build_week_view(self.anchor, &self.events, &settings, formatter.as_ref(), today);

        let mut controller = WeekViewController {
            settings,
            formatter,
            is_disabled: self.is_disabled,
            clock,
            observer: self.observer.unwrap_or_else(|| Box::new(NoopObserver)),
            anchor: self.anchor,
            events: self.events,
            view,
        };
        controller.notify_refreshed();
        Ok(controller)
    }
}

/// Owns the current [`WeekView`] and rebuilds it on every trigger.
pub struct WeekViewController {
    settings: GridSettings,
    formatter: Box<dyn DateFormatter>,
    is_disabled: Option<Box<DisabledPredicate>>,
    clock: Box<dyn Clock>,
    observer: Box<dyn WeekViewObserver>,
    anchor: DateTime<Utc>,
    events: Vec<CalendarEvent>,
    view: WeekView,
}

impl WeekViewController {
    pub fn builder(config: WeekViewConfig, anchor: DateTime<Utc>) -> WeekViewBuilder {
        WeekViewBuilder {
            config,
            anchor,
            events: Vec::new(),
            formatter: None,
            is_disabled: None,
            clock: None,
            observer: None,
        }
    }

    pub fn view(&self) -> &WeekView {
        &self.view
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Move the anchor and rebuild.
    pub fn set_anchor(&mut self, anchor: DateTime<Utc>) {
        self.anchor = anchor;
        self.refresh();
    }

    /// Replace the event source and rebuild the current week.
    pub fn set_events(&mut self, events: Vec<CalendarEvent>) {
        self.events = events;
        self.rebuild();
        debug!(events = self.events.len(), "event source replaced");
        self.notify_auto_selected();
    }

    /// Shift the anchor one week in `direction` and rebuild.
    ///
    /// The shift is seven calendar days at the same local wall-clock time.
    pub fn move_by(&mut self, direction: MoveDirection) {
        if direction == MoveDirection::Stay {
            return;
        }
        let tz = self.settings.tz;
        let local = self.anchor.with_timezone(&tz).naive_local();
        let shifted = local + Duration::days(DAYS_PER_WEEK as i64 * direction.weeks());
        self.anchor = resolve_local(&tz, shifted).with_timezone(&Utc);
        info!(?direction, anchor = %self.anchor, "moved week view");
        self.refresh();
    }

    /// Rebuild for the current anchor and fire every refresh notification.
    #[tracing::instrument(skip_all)]
    pub fn refresh(&mut self) {
        self.rebuild();
        self.notify_refreshed();
    }

    /// Pick day `day_index` of the current week.
    ///
    /// The anchor moves to that day; the payload lists the day's all-day
    /// events. Returns `None` for an index outside the week.
    pub fn day_selected(&mut self, day_index: usize) -> Option<TimeSelected> {
        let date = self.view.dates.get(day_index)?.date;
        self.anchor = date.with_timezone(&Utc);

        let payload = select_day(
            &mut self.view,
            &date,
            &self.settings.tz,
            self.is_disabled.as_deref(),
        );
        self.observer.time_selected(&payload);
        Some(payload)
    }

    /// Pick the grid cell at `row`, `day_index`.
    pub fn slot_selected(&mut self, row: usize, day_index: usize) -> Option<TimeSelected> {
        let cell = self.view.rows.get(row)?.get(day_index)?;
        let payload = time_selected(&self.view, cell.time, &cell.events, self.is_disabled.as_deref());
        self.observer.time_selected(&payload);
        Some(payload)
    }

    /// Report a click on a placed fragment. Returns its source event.
    pub fn event_selected(&mut self, fragment: &Fragment) -> Option<CalendarEvent> {
        let event = self.view.event(fragment)?.clone();
        self.observer.event_selected(&event);
        Some(event)
    }

    /// Title of the current week, formatted from its first day at local noon.
    pub fn title(&self) -> String {
        let first_day = self.view.range.start_time.with_timezone(&self.settings.tz).date_naive();
        let noon = resolve_local(&self.settings.tz, first_day.and_time(chrono::NaiveTime::MIN) + Duration::hours(12));
        self.formatter.format_title(&noon.fixed_offset())
    }

    /// One label per displayed row, taken from the first day's column.
    pub fn hour_column_labels(&self) -> Vec<String> {
        self.view
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(|cell| self.formatter.format_hour_label(&cell.time))
            .collect()
    }

    fn rebuild(&mut self) {
        let today = self.clock.now();
        self.view = build_week_view(
            self.anchor,
            &self.events,
            &self.settings,
            self.formatter.as_ref(),
            today,
        );
        debug!(
            start = %self.view.range.start_time,
            end = %self.view.range.end_time,
            events = self.events.len(),
            rejected = self.view.rejected.len(),
            "rebuilt week view"
        );
    }

    fn notify_refreshed(&mut self) {
        let title = self.title();
        self.observer.title_changed(&title);
        self.observer.range_changed(&self.view.range);
        self.notify_auto_selected();
    }

    /// With auto-select on, announce the selected day after every rebuild.
    fn notify_auto_selected(&mut self) {
        if !self.settings.auto_select {
            return;
        }
        let Some(date) = self.view.selected_date() else {
            return;
        };
        let payload = time_selected(&self.view, date.date, &date.events, self.is_disabled.as_deref());
        self.observer.time_selected(&payload);
    }
}
