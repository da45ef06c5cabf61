//! # timegrid-engine
//!
//! Deterministic week-view layout for calendar UIs.
//!
//! Given a list of events, an anchor date and a view configuration, the
//! engine produces a [`WeekView`]: a 7-day × time-slot grid in which every
//! event is split into per-day fragments, clipped to the displayed hours,
//! assigned a non-overlapping column, and given the width of its true
//! overlap cluster. Rendering, gestures and locale text are left to the
//! caller.
//!
//! ## Modules
//!
//! - [`range`] — 7-day window for an anchor date and week-start day
//! - [`grid`] — empty slot rows and day headers
//! - [`projector`] — events → per-day fragments with sub-slot offsets
//! - [`layout`] — overlap predicate, column assignment, cluster widths
//! - [`selection`] — today / selected flags and selection payloads
//! - [`controller`] — recompute driver, navigation and notifications
//! - [`config`] — configuration and its validated form
//! - [`format`] — injectable label formatting
//! - [`error`] — Error types

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod format;
pub mod grid;
pub mod layout;
pub mod projector;
pub mod range;
pub mod selection;
pub mod view;

pub use config::{Direction, GridSettings, SlotSpan, WeekViewConfig};
pub use controller::{
    build_week_view, Clock, FixedClock, MoveDirection, NoopObserver, SystemClock,
    WeekViewBuilder, WeekViewController, WeekViewObserver,
};
pub use error::TimegridError;
pub use event::CalendarEvent;
pub use format::{DateFormatter, DefaultFormatter};
pub use grid::{build_date_cells, build_grid};
pub use layout::{
    calculate_position, calculate_width, layout_view, overlaps, place_all_day_events,
    place_events,
};
pub use projector::{project_events, Projected};
pub use range::{get_range, parse_anchor, TimeRange};
pub use selection::{update_current_view, TimeSelected};
pub use view::{DateCell, Fragment, Highlight, RejectedEvent, SlotCell, WeekView};
