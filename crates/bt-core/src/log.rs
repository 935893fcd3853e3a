//! Parsed build log with its step tree retained for re-filtering.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::activity::parse_activity_log;
use crate::build_step::{BuildStep, parse_build_steps};
use crate::dependency::Dependency;
use crate::error::BuildLogError;
use crate::event::{Event, convert_to_events};
use crate::filter::FilterSettings;
use crate::lexer::tokenize;
use crate::project::Project;
use crate::step_type::DetailStepType;

/// The step tree of one build.
///
/// Parsing happens once; events are derived from the tree on demand, so a
/// filter change never re-reads the log.
#[derive(Debug, Clone)]
pub struct BuildLog {
    root: BuildStep,
}

impl BuildLog {
    /// Parses decompressed activity log text.
    pub fn parse(text: &str) -> Result<Self, BuildLogError> {
        let started = Instant::now();
        let tokens = tokenize(text)?;
        tracing::debug!(tokens = tokens.len(), elapsed = ?started.elapsed(), "tokenized activity log");

        let started = Instant::now();
        let activity_log = parse_activity_log(&tokens)?;
        tracing::debug!(
            version = activity_log.version,
            elapsed = ?started.elapsed(),
            "read activity log"
        );

        let started = Instant::now();
        let root = parse_build_steps(&activity_log)?;
        tracing::debug!(
            targets = root.sub_steps.len(),
            elapsed = ?started.elapsed(),
            "built step tree"
        );
        tracing::trace!(tree = %root.describe(), "step tree");

        Ok(Self { root })
    }

    pub const fn from_root(root: BuildStep) -> Self {
        Self { root }
    }

    pub const fn root(&self) -> &BuildStep {
        &self.root
    }

    /// Title of the build, e.g. `Build App`.
    pub fn title(&self) -> &str {
        self.root.display_title()
    }

    /// Events under `filter`, or `EmptyResult` when none survive.
    pub fn events(&self, filter: &FilterSettings) -> Result<Vec<Event>, BuildLogError> {
        let started = Instant::now();
        let events = convert_to_events(&self.root, filter);
        tracing::debug!(events = events.len(), elapsed = ?started.elapsed(), "converted events");
        if events.is_empty() {
            return Err(BuildLogError::EmptyResult);
        }
        Ok(events)
    }

    /// Events under `filter` linked with `dependencies`.
    pub fn project(
        &self,
        filter: &FilterSettings,
        dependencies: Vec<Dependency>,
    ) -> Result<Project, BuildLogError> {
        Ok(Project::new(self.events(filter)?, dependencies))
    }

    /// The target step an event was built from.
    pub fn step_for_event(&self, event: &Event) -> Option<&BuildStep> {
        self.root
            .sub_steps
            .iter()
            .find(|step| step.display_title() == event.task_name)
    }

    /// Detail steps per category across the whole build.
    pub fn step_counts(&self) -> BTreeMap<DetailStepType, usize> {
        self.root.count_by_type()
    }
}
