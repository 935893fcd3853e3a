//! Shared builders for unit tests.

use chrono::{DateTime, TimeDelta, Utc};

use crate::build_step::{BuildStep, StepKind};
use crate::event::Event;
use crate::step_type::DetailStepType;
use crate::time::from_seconds;

/// Fixed instant plus `secs` seconds.
pub fn at(secs: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap() + from_seconds(secs)
}

/// Detail step typed by its title, spanning `[start, end]` seconds.
pub fn detail(title: &str, start: f64, end: f64, sub_steps: Vec<BuildStep>) -> BuildStep {
    BuildStep {
        kind: StepKind::Detail,
        title: title.to_string(),
        signature: title.to_string(),
        start_date: at(start),
        duration: at(end) - at(start),
        fetched_from_cache: false,
        detail_step_type: DetailStepType::from_signature(title),
        warning_count: 0,
        error_count: 0,
        sub_steps,
    }
}

/// Target step whose span covers all of its sub-steps.
pub fn target(title: &str, sub_steps: Vec<BuildStep>) -> BuildStep {
    let start = sub_steps.iter().map(|s| s.start_date).min().unwrap_or_else(|| at(0.0));
    let end = sub_steps.iter().map(BuildStep::end_date).max().unwrap_or(start);
    BuildStep {
        kind: StepKind::Target,
        title: format!("Build target {title}"),
        signature: String::new(),
        start_date: start,
        duration: end - start,
        fetched_from_cache: false,
        detail_step_type: DetailStepType::None,
        warning_count: 0,
        error_count: 0,
        sub_steps,
    }
}

/// Main step starting at `start` seconds.
pub fn root(start: f64, targets: Vec<BuildStep>) -> BuildStep {
    BuildStep {
        kind: StepKind::Main,
        title: "Build App".to_string(),
        signature: String::new(),
        start_date: at(start),
        duration: TimeDelta::seconds(60),
        fetched_from_cache: false,
        detail_step_type: DetailStepType::None,
        warning_count: 0,
        error_count: 0,
        sub_steps: targets,
    }
}

/// Event without steps spanning `[start, end]` seconds.
pub fn event(name: &str, start: f64, end: f64) -> Event {
    Event::new(name, at(start), at(end) - at(start), false, Vec::new())
}

/// Event covering its steps.
pub fn event_with_steps(name: &str, steps: Vec<Event>) -> Event {
    let start = steps.iter().map(|s| s.start_date).min().unwrap_or_else(|| at(0.0));
    let end = steps.iter().map(Event::end_date).max().unwrap_or(start);
    Event::new(name, start, end - start, false, steps)
}
