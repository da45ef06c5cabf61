//! Overlap layout: column assignment and cluster widths.
//!
//! Timed fragments are laid out one day at a time; all-day banners are laid
//! out across the whole week as a single group. Within a group, fragments
//! are processed in start order and greedily given the lowest column not
//! used by an earlier overlapping fragment. The width divisor of a fragment
//! is then the column count of its connected overlap cluster, found by
//! flood-filling over a fine-grained timeline of `rows * hour_parts` cells.

use std::collections::VecDeque;
use std::ops::Range;

use tracing::trace;

use crate::config::{Direction, GridSettings};
use crate::range::DAYS_PER_WEEK;
use crate::view::{Fragment, WeekView};

/// Whether two fragments of the same group share time.
///
/// Fragments that meet within one row still do not overlap when the end
/// offset of the earlier one and the start offset of the later one together
/// leave no shared part of that row.
pub fn overlaps(a: &Fragment, b: &Fragment, hour_parts: u32) -> bool {
    let (early, late) = if a.start_slot > b.start_slot
        || (a.start_slot == b.start_slot && a.start_offset > b.start_offset)
    {
        (b, a)
    } else {
        (a, b)
    };

    if early.end_slot <= late.start_slot {
        return false;
    }
    !(early.end_slot - late.start_slot == 1 && early.end_offset + late.start_offset >= hour_parts)
}

/// Assign a column to every fragment, in slice order. Returns the number of
/// columns used.
///
/// Each fragment takes the lowest column not held by an earlier fragment it
/// overlaps. With [`Direction::Rtl`] the columns are mirrored afterwards.
pub fn calculate_position(fragments: &mut [Fragment], hour_parts: u32, direction: Direction) -> usize {
    let mut max_column = 0;
    let mut forbidden = vec![false; fragments.len()];

    for i in 0..fragments.len() {
        forbidden[..max_column].fill(false);
        for j in 0..i {
            if overlaps(&fragments[i], &fragments[j], hour_parts) {
                forbidden[fragments[j].column] = true;
            }
        }

        fragments[i].column = match (0..max_column).find(|&column| !forbidden[column]) {
            Some(column) => column,
            None => {
                max_column += 1;
                max_column - 1
            }
        };
    }

    if direction == Direction::Rtl {
        mirror_columns(fragments, max_column);
    }
    max_column
}

/// Reflect columns within `0..max_column`.
pub fn mirror_columns(fragments: &mut [Fragment], max_column: usize) {
    for fragment in fragments {
        fragment.column = max_column - 1 - fragment.column;
    }
}

/// Set `cluster_width` of every fragment from its connected overlap cluster.
///
/// Fragments are seeded in descending column order, so each cluster is
/// reached first through its right-most member and every member ends up with
/// `column < cluster_width`.
pub fn calculate_width(fragments: &mut [Fragment], total_slots: usize, hour_parts: u32) {
    let parts = hour_parts as usize;
    let total_cells = total_slots * parts;

    let mut order: Vec<usize> = (0..fragments.len()).collect();
    order.sort_by(|&a, &b| fragments[b].column.cmp(&fragments[a].column));

    let mut occupants: Vec<Vec<usize>> = vec![Vec::new(); total_cells];
    for &index in &order {
        for cell in occupied_cells(&fragments[index], parts, total_cells) {
            occupants[cell].push(index);
        }
    }

    let mut visited = vec![false; total_cells];
    let mut widths: Vec<Option<usize>> = vec![None; fragments.len()];
    let mut queue = VecDeque::new();

    for &seed in &order {
        if widths[seed].is_some() {
            continue;
        }
        let width = fragments[seed].column + 1;
        widths[seed] = Some(width);
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            for cell in occupied_cells(&fragments[current], parts, total_cells) {
                if visited[cell] {
                    continue;
                }
                visited[cell] = true;
                for &other in &occupants[cell] {
                    if widths[other].is_none() {
                        widths[other] = Some(width);
                        queue.push_back(other);
                    }
                }
            }
        }
    }

    for (fragment, width) in fragments.iter_mut().zip(widths) {
        fragment.cluster_width = width.unwrap_or(1);
    }
}

/// Columns and cluster widths for one day of timed fragments.
pub fn place_events(fragments: &mut [Fragment], total_slots: usize, settings: &GridSettings) -> usize {
    let columns = calculate_position(fragments, settings.hour_parts, settings.direction);
    calculate_width(fragments, total_slots, settings.hour_parts);
    columns
}

/// Columns for the week's all-day banners. Banners are never width-divided.
pub fn place_all_day_events(fragments: &mut [Fragment], settings: &GridSettings) -> usize {
    calculate_position(fragments, settings.hour_parts, settings.direction)
}

/// Lay out every group of a freshly projected view in place.
pub fn layout_view(view: &mut WeekView, settings: &GridSettings) {
    let total_slots = view.rows.len();

    for day in 0..DAYS_PER_WEEK {
        let mut ordered = Vec::new();
        for row in view.rows.iter_mut() {
            if let Some(cell) = row.get_mut(day) {
                let mut events = std::mem::take(&mut cell.events);
                events.sort_by_key(|fragment| fragment.start_offset);
                ordered.append(&mut events);
            }
        }
        if ordered.is_empty() {
            continue;
        }

        let columns = place_events(&mut ordered, total_slots, settings);
        trace!(day, fragments = ordered.len(), columns, "placed timed fragments");

        for fragment in ordered {
            if let Some(cell) = view
                .rows
                .get_mut(fragment.start_slot)
                .and_then(|row| row.get_mut(day))
            {
                cell.events.push(fragment);
            }
        }
    }

    let mut banners: Vec<Fragment> = view
        .dates
        .iter_mut()
        .flat_map(|date| std::mem::take(&mut date.events))
        .collect();
    if banners.is_empty() {
        return;
    }

    let columns = place_all_day_events(&mut banners, settings);
    trace!(fragments = banners.len(), columns, "placed all-day banners");

    for banner in banners {
        if let Some(date) = view.dates.get_mut(banner.day_index) {
            date.events.push(banner);
        }
    }
}

fn occupied_cells(fragment: &Fragment, parts: usize, total_cells: usize) -> Range<usize> {
    let start = (fragment.start_slot * parts + fragment.start_offset as usize).min(total_cells);
    let end = (fragment.end_slot * parts)
        .saturating_sub(fragment.end_offset as usize)
        .min(total_cells);
    start..end.max(start)
}
