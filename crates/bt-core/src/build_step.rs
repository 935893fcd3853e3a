//! Build step tree projected from the activity log.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, TimeDelta, Utc};

use crate::activity::{ActivityLog, LogMessage, LogSection};
use crate::error::BuildLogError;
use crate::step_type::DetailStepType;
use crate::time::{as_seconds, reference_date_to_utc};

/// Title prefix Xcode gives target sections.
pub const BUILD_TARGET_PREFIX: &str = "Build target ";

/// Depth of a step in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// The whole build.
    Main,
    /// One target of the build.
    Target,
    /// A command run for a target, or a group of them.
    Detail,
}

/// One node of the raw step tree. Parents own their sub-steps.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildStep {
    pub kind: StepKind,
    pub title: String,
    pub signature: String,
    pub start_date: DateTime<Utc>,
    /// Never negative.
    pub duration: TimeDelta,
    pub fetched_from_cache: bool,
    pub detail_step_type: DetailStepType,
    /// Warnings recorded by this step and everything below it.
    pub warning_count: usize,
    /// Errors recorded by this step and everything below it.
    pub error_count: usize,
    pub sub_steps: Vec<BuildStep>,
}

/// Strips the exact `"Build target "` prefix, leaving other titles alone.
pub fn strip_build_target_prefix(title: &str) -> &str {
    title.strip_prefix(BUILD_TARGET_PREFIX).unwrap_or(title)
}

impl BuildStep {
    pub fn end_date(&self) -> DateTime<Utc> {
        self.start_date + self.duration
    }

    /// Title as shown to users: target names without their prefix.
    pub fn display_title(&self) -> &str {
        strip_build_target_prefix(&self.title)
    }

    /// Replaces every Swift compilation step that has sub-steps with those
    /// sub-steps, in place.
    ///
    /// Whole-module builds group per-file compilations under one
    /// `CompileSwift` step:
    ///
    /// ```text
    /// Target                    Target
    ///   CompileSwift              CompileSwift a.swift
    ///     CompileSwift a.swift      CompileSwift b.swift
    ///     CompileSwift b.swift      Ld
    ///   Ld
    /// ```
    ///
    /// Spliced sub-steps are flattened again, so nested groups disappear too.
    #[must_use]
    pub fn move_swift_steps_to_root(mut self) -> Self {
        let sub_steps = std::mem::take(&mut self.sub_steps);
        self.sub_steps = flatten_swift_groups(sub_steps);
        self
    }

    /// Number of detail steps per category in this subtree.
    pub fn count_by_type(&self) -> BTreeMap<DetailStepType, usize> {
        let mut counts = BTreeMap::new();
        self.count_into(&mut counts);
        counts
    }

    fn count_into(&self, counts: &mut BTreeMap<DetailStepType, usize>) {
        for step in &self.sub_steps {
            if step.kind == StepKind::Detail {
                *counts.entry(step.detail_step_type).or_default() += 1;
            }
            step.count_into(counts);
        }
    }

    /// Indented `duration title` listing of the subtree, one step per line.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, "");
        out
    }

    fn describe_into(&self, out: &mut String, indent: &str) {
        let _ = writeln!(out, "{:.2} {}", as_seconds(self.duration), self.title);
        let nested = format!("{indent}\t");
        for step in &self.sub_steps {
            if step.sub_steps.is_empty() {
                let _ = writeln!(
                    out,
                    "{indent}{:.2}\t{}",
                    as_seconds(step.duration),
                    step.title
                );
            } else {
                step.describe_into(out, &nested);
            }
        }
    }
}

fn flatten_swift_groups(steps: Vec<BuildStep>) -> Vec<BuildStep> {
    let mut flattened = Vec::with_capacity(steps.len());
    for step in steps {
        if step.detail_step_type == DetailStepType::SwiftCompilation && !step.sub_steps.is_empty()
        {
            flattened.extend(flatten_swift_groups(step.sub_steps));
        } else {
            flattened.push(step.move_swift_steps_to_root());
        }
    }
    flattened
}

/// Builds the step tree for a parsed activity log.
///
/// The main section becomes the [`StepKind::Main`] step, its sub-sections the
/// targets and everything below them detail steps. Targets come back with
/// their Swift groups already flattened.
pub fn parse_build_steps(log: &ActivityLog<'_>) -> Result<BuildStep, BuildLogError> {
    step_from_section(&log.main_section, StepKind::Main)
}

fn step_from_section(section: &LogSection<'_>, kind: StepKind) -> Result<BuildStep, BuildLogError> {
    let child_kind = match kind {
        StepKind::Main => StepKind::Target,
        StepKind::Target | StepKind::Detail => StepKind::Detail,
    };
    let sub_steps = section
        .sub_sections
        .iter()
        .map(|sub_section| step_from_section(sub_section, child_kind))
        .collect::<Result<Vec<_>, _>>()?;

    let start_date = timestamp(section.time_started_recording)?;
    let end_date = timestamp(section.time_stopped_recording)?;
    let duration = (end_date - start_date).max(TimeDelta::zero());

    let detail_step_type = match kind {
        StepKind::Detail => DetailStepType::from_signature(section.signature),
        StepKind::Main | StepKind::Target => DetailStepType::None,
    };

    // Targets restored from cache do not always carry the flag themselves.
    let fetched_from_cache = section.was_fetched_from_cache
        || (kind != StepKind::Detail
            && !sub_steps.is_empty()
            && sub_steps.iter().all(|step| step.fetched_from_cache));

    let (own_warnings, own_errors) = severity_counts(&section.messages);
    let warning_count = own_warnings + sub_steps.iter().map(|s| s.warning_count).sum::<usize>();
    let error_count = own_errors + sub_steps.iter().map(|s| s.error_count).sum::<usize>();

    let step = BuildStep {
        kind,
        title: section.title.to_string(),
        signature: section.signature.to_string(),
        start_date,
        duration,
        fetched_from_cache,
        detail_step_type,
        warning_count,
        error_count,
        sub_steps,
    };

    Ok(match kind {
        StepKind::Target => step.move_swift_steps_to_root(),
        StepKind::Main | StepKind::Detail => step,
    })
}

fn timestamp(seconds: f64) -> Result<DateTime<Utc>, BuildLogError> {
    reference_date_to_utc(seconds).ok_or(BuildLogError::InvalidTimestamp(seconds))
}

fn severity_counts(messages: &[LogMessage<'_>]) -> (usize, usize) {
    messages.iter().fold((0, 0), |(warnings, errors), message| {
        (
            warnings + usize::from(message.is_warning()),
            errors + usize::from(message.is_error()),
        )
    })
}
