//! Concurrency analysis over a set of events.
//!
//! Every function here is pure and works on any slice of events; order is
//! not significant. Activity is measured on leaf steps, so an event does not
//! count as running in the gaps between its steps.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::event::Event;
use crate::time::as_seconds;

/// Default offset either side of an event's end used by [`is_blocker`].
pub const BLOCKER_EPSILON_MS: i64 = 10;

pub fn blocker_epsilon() -> TimeDelta {
    TimeDelta::milliseconds(BLOCKER_EPSILON_MS)
}

/// An interval between two consecutive breakpoints with the concurrency
/// sampled at its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub concurrency: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Number of events with a leaf running at `at`, bounds included.
pub fn concurrency(events: &[Event], at: DateTime<Utc>) -> usize {
    events.iter().filter(|event| event.hits(at)).count()
}

/// Splits the timeline at every leaf start and end.
///
/// Adjacent periods with the same concurrency are not merged.
pub fn all_periods(events: &[Event]) -> Vec<Period> {
    let mut breakpoints: Vec<DateTime<Utc>> = events
        .iter()
        .flat_map(Event::leaf_spans)
        .flat_map(|(start, end)| [start, end])
        .collect();
    breakpoints.sort_unstable();
    breakpoints.dedup();

    breakpoints
        .windows(2)
        .map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            let middle = start + (end - start) / 2;
            Period {
                concurrency: concurrency(events, middle),
                start,
                end,
            }
        })
        .collect()
}

/// Whether finishing `event` let more work run, sampled
/// [`BLOCKER_EPSILON_MS`] either side of its end.
pub fn is_blocker(events: &[Event], event: &Event) -> bool {
    is_blocker_with_epsilon(events, event, blocker_epsilon())
}

/// [`is_blocker`] with a custom sampling offset.
///
/// Only the other events are counted: `event` is a blocker when more of them
/// run just after its end than just before. Events sharing its name count as
/// `event` itself. An end too close to the representable range to be
/// sampled is never a blocker.
pub fn is_blocker_with_epsilon(events: &[Event], event: &Event, epsilon: TimeDelta) -> bool {
    let end = event.end_date();
    let (Some(after), Some(before)) = (
        end.checked_add_signed(epsilon),
        end.checked_sub_signed(epsilon),
    ) else {
        return false;
    };
    let running_at = |at: DateTime<Utc>| {
        events
            .iter()
            .filter(|other| *other != event && other.hits(at))
            .count()
    };
    running_at(after) > running_at(before)
}

/// Every blocker in `events`, in input order.
pub fn blockers(events: &[Event], epsilon: TimeDelta) -> Vec<&Event> {
    events
        .iter()
        .filter(|event| is_blocker_with_epsilon(events, event, epsilon))
        .collect()
}

pub fn timeline_start(events: &[Event]) -> Option<DateTime<Utc>> {
    events.iter().map(|e| e.start_date).min()
}

pub fn timeline_end(events: &[Event]) -> Option<DateTime<Utc>> {
    events.iter().map(Event::end_date).max()
}

/// Wall time from the first start to the last end.
pub fn timeline_duration(events: &[Event]) -> Option<TimeDelta> {
    Some(timeline_end(events)? - timeline_start(events)?)
}

/// Event starts and ends right after which exactly `concurrency` events run.
pub fn periods_with_concurrency(
    events: &[Event],
    concurrency_level: usize,
    epsilon: TimeDelta,
) -> Vec<DateTime<Utc>> {
    let mut dates: Vec<DateTime<Utc>> = events
        .iter()
        .flat_map(|e| [e.start_date, e.end_date()])
        .filter(|&date| {
            date.checked_add_signed(epsilon)
                .is_some_and(|at| concurrency(events, at) == concurrency_level)
        })
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Offset and length of `[start, end]` as fractions of the whole timeline.
///
/// `None` for an empty or zero-length timeline.
pub fn relative_span(
    events: &[Event],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<(f64, f64)> {
    let origin = timeline_start(events)?;
    let total = as_seconds(timeline_duration(events)?);
    if total <= 0.0 {
        return None;
    }
    Some((
        as_seconds(start - origin) / total,
        as_seconds(end - start) / total,
    ))
}
