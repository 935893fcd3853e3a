//! Presentation-ready events derived from the build step tree.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::build_step::BuildStep;
use crate::filter::FilterSettings;

const HELPERS_SUFFIX: &str = "TestHelpers";
const TESTS_SUFFIX: &str = "TestHelpers-Unit-Tests";

/// A filtered build step with its timing.
///
/// Equality and hashing only look at `task_name`; use [`Event::same_shape`]
/// to compare timing and children as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub task_name: String,
    pub start_date: DateTime<Utc>,
    #[serde(rename = "duration_secs", with = "crate::serde_duration")]
    pub duration: TimeDelta,
    pub fetched_from_cache: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Event>,
    /// Names of the events this one depends on. Filled by
    /// [`Project::connect`](crate::Project::connect) and resolved through the
    /// project; never owning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.task_name == other.task_name
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.task_name.hash(state);
    }
}

/// Role of a module, derived from its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Framework,
    Helpers,
    Tests,
}

impl Event {
    pub fn new(
        task_name: impl Into<String>,
        start_date: DateTime<Utc>,
        duration: TimeDelta,
        fetched_from_cache: bool,
        steps: Vec<Self>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            start_date,
            duration,
            fetched_from_cache,
            steps,
            parents: Vec::new(),
        }
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.start_date + self.duration
    }

    /// Structural comparison: name, timing, cache flag and children.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.task_name == other.task_name
            && self.start_date == other.start_date
            && self.duration == other.duration
            && self.fetched_from_cache == other.fetched_from_cache
            && self.steps.len() == other.steps.len()
            && self
                .steps
                .iter()
                .zip(&other.steps)
                .all(|(a, b)| a.same_shape(b))
    }

    /// Whether any leaf below this event is running at `at`, bounds included.
    ///
    /// An event without steps is its own leaf.
    pub fn hits(&self, at: DateTime<Utc>) -> bool {
        if self.steps.is_empty() {
            self.start_date <= at && at <= self.end_date()
        } else {
            self.steps.iter().any(|step| step.hits(at))
        }
    }

    /// `(start, end)` of every leaf below this event.
    pub fn leaf_spans(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let mut spans = Vec::new();
        self.collect_leaf_spans(&mut spans);
        spans
    }

    fn collect_leaf_spans(&self, spans: &mut Vec<(DateTime<Utc>, DateTime<Utc>)>) {
        if self.steps.is_empty() {
            spans.push((self.start_date, self.end_date()));
        } else {
            for step in &self.steps {
                step.collect_leaf_spans(spans);
            }
        }
    }

    pub fn module_kind(&self) -> ModuleKind {
        if self.task_name.ends_with(HELPERS_SUFFIX) {
            ModuleKind::Helpers
        } else if self.task_name.ends_with(TESTS_SUFFIX) {
            ModuleKind::Tests
        } else {
            ModuleKind::Framework
        }
    }

    /// Module name without its helpers or tests suffix, shared by a
    /// framework and its test targets.
    pub fn domain(&self) -> &str {
        self.task_name
            .strip_suffix(HELPERS_SUFFIX)
            .or_else(|| self.task_name.strip_suffix(TESTS_SUFFIX))
            .unwrap_or(&self.task_name)
    }
}

fn timeline_order(a: &Event, b: &Event) -> Ordering {
    a.start_date
        .cmp(&b.start_date)
        .then_with(|| a.task_name.cmp(&b.task_name))
}

/// Sorts siblings by start date, then by name.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(timeline_order);
}

/// Converts the targets under `root` into events.
///
/// Targets are converted in parallel. Each keeps the sub-steps the filter
/// admits and is timed from the first of them to the end of the last; a
/// target with nothing left is dropped.
pub fn convert_to_events(root: &BuildStep, filter: &FilterSettings) -> Vec<Event> {
    let mut events: Vec<Event> = root
        .sub_steps
        .par_iter()
        .filter_map(|target| target_event(target, root.start_date, filter))
        .collect();
    sort_events(&mut events);
    events
}

fn target_event(
    target: &BuildStep,
    build_start: DateTime<Utc>,
    filter: &FilterSettings,
) -> Option<Event> {
    if filter.hides_target(target) {
        return None;
    }

    let admitted: Vec<&BuildStep> = target
        .sub_steps
        .iter()
        .filter(|step| filter.admits(step, build_start))
        .collect();
    let start_date = admitted.first()?.start_date;
    let end_date = admitted.last()?.end_date();

    Some(Event::new(
        target.display_title(),
        start_date,
        (end_date - start_date).max(TimeDelta::zero()),
        target.fetched_from_cache,
        convert_all(admitted),
    ))
}

/// Converts steps one to one, keeping their recorded timing and every
/// descendant.
pub fn convert_all<'s>(steps: impl IntoIterator<Item = &'s BuildStep>) -> Vec<Event> {
    let mut events: Vec<Event> = steps
        .into_iter()
        .map(|step| {
            Event::new(
                step.display_title(),
                step.start_date,
                step.duration,
                step.fetched_from_cache,
                convert_all(&step.sub_steps),
            )
        })
        .collect();
    sort_events(&mut events);
    events
}
