//! Events linked with their dependencies, and the log files they came from.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::dependency::Dependency;
use crate::error::BuildLogError;
use crate::event::Event;
use crate::filter::FilterSettings;
use crate::log::BuildLog;

/// Top-level events of one build with the dependency edges between them.
///
/// The dependency list is kept so the parents relation can be rebuilt after
/// the events are re-derived under another filter.
#[derive(Debug, Clone, Default)]
pub struct Project {
    events: Vec<Event>,
    dependencies: Vec<Dependency>,
}

impl Project {
    pub fn new(events: Vec<Event>, dependencies: Vec<Dependency>) -> Self {
        let mut project = Self {
            events,
            dependencies,
        };
        project.connect();
        project
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Rebuilds every event's `parents` from the dependency list.
    ///
    /// An edge is linked only when both ends name a current event. Self edges
    /// and repeated edges are dropped.
    pub fn connect(&mut self) {
        let positions: HashMap<String, usize> = self
            .events
            .iter()
            .enumerate()
            .map(|(i, e)| (e.task_name.clone(), i))
            .collect();

        for event in &mut self.events {
            event.parents.clear();
        }

        for dependency in &self.dependencies {
            if dependency.from == dependency.to || !positions.contains_key(&dependency.from) {
                continue;
            }
            let Some(&to) = positions.get(&dependency.to) else {
                continue;
            };
            let parents = &mut self.events[to].parents;
            if !parents.contains(&dependency.from) {
                parents.push(dependency.from.clone());
            }
        }
    }

    /// Re-derives the events from the retained step tree and relinks them.
    ///
    /// On `EmptyResult` the project keeps its current events.
    pub fn refilter(&mut self, log: &BuildLog, filter: &FilterSettings) -> Result<(), BuildLogError> {
        self.events = log.events(filter)?;
        self.connect();
        Ok(())
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.task_name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.events.iter().position(|e| e.task_name == name)
    }

    /// Direct dependencies of `event` present in this project.
    pub fn parents_of<'p>(&'p self, event: &Event) -> impl Iterator<Item = &'p Event> {
        event.parents.iter().filter_map(|name| self.event(name))
    }

    /// Every event `event` transitively depends on, nearest first.
    ///
    /// Cycles in the dependency data are cut by tracking visited names.
    pub fn ancestors(&self, event: &Event) -> Vec<&Event> {
        let mut visited: HashSet<&str> = HashSet::from([event.task_name.as_str()]);
        let mut queue: VecDeque<&Event> = self.parents_of(event).collect();
        let mut ancestors = Vec::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.task_name.as_str()) {
                continue;
            }
            ancestors.push(current);
            queue.extend(self.parents_of(current));
        }
        ancestors
    }

    /// The parent that finished last before `event` started, which is the
    /// one `event` was actually waiting on.
    pub fn gating_parent(&self, event: &Event) -> Option<&Event> {
        self.parents_of(event)
            .filter(|parent| parent.end_date() <= event.start_date)
            .max_by_key(|parent| parent.end_date())
    }

    /// Whether `parent` is the gating parent of `event`.
    pub fn is_blocked_by(&self, event: &Event, parent: &Event) -> bool {
        self.gating_parent(event)
            .is_some_and(|gating| gating.task_name == parent.task_name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectError {
    #[error("project {0} has no activity logs")]
    NoActivityLogs(String),
}

/// The files of one project handed in by whoever located them: one or more
/// captured activity logs and an optional target graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    name: String,
    activity_logs: Vec<PathBuf>,
    dependency_manifest: Option<PathBuf>,
    current_index: usize,
}

impl ProjectReference {
    /// Starts at the first log. Fails when `activity_logs` is empty.
    pub fn new(
        name: impl Into<String>,
        activity_logs: Vec<PathBuf>,
        dependency_manifest: Option<PathBuf>,
    ) -> Result<Self, ProjectError> {
        let name = name.into();
        if activity_logs.is_empty() {
            return Err(ProjectError::NoActivityLogs(name));
        }
        Ok(Self {
            name,
            activity_logs,
            dependency_manifest,
            current_index: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn activity_logs(&self) -> &[PathBuf] {
        &self.activity_logs
    }

    pub fn dependency_manifest(&self) -> Option<&Path> {
        self.dependency_manifest.as_deref()
    }

    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_log(&self) -> &Path {
        &self.activity_logs[self.current_index]
    }

    pub const fn can_select_previous(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_select_next(&self) -> bool {
        self.current_index + 1 < self.activity_logs.len()
    }

    /// Moves to the previous log; `false` when already at the first.
    pub fn select_previous(&mut self) -> bool {
        if !self.can_select_previous() {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Moves to the next log; `false` when already at the last.
    pub fn select_next(&mut self) -> bool {
        if !self.can_select_next() {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// One-based position, e.g. `"2 of 3"`.
    pub fn index_description(&self) -> String {
        format!("{} of {}", self.current_index + 1, self.activity_logs.len())
    }
}

/// Project name from a derived data folder name (`App-abcdef` → `App`).
///
/// Everything before the last `-` is kept; names without one come back
/// empty.
pub fn short_name(folder_name: &str) -> &str {
    folder_name.rsplit_once('-').map_or("", |(name, _)| name)
}
