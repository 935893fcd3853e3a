//! CLI subcommand implementations.

pub mod blockers;
pub mod events;
pub mod periods;
pub mod steps;
pub mod summary;
mod util;

use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{BuildLog, Dependency, FilterSettings, ManifestParse, Project, parse_manifest_file};
use chrono::TimeDelta;

use crate::cli::LogArgs;
use crate::config::Config;
use crate::input::read_log_text;

/// A parsed build log with everything needed to derive its project.
#[derive(Debug)]
pub struct LoadedLog {
    pub log: BuildLog,
    pub manifest: Option<ManifestParse>,
    pub filter: FilterSettings,
    pub blocker_epsilon: TimeDelta,
}

impl LoadedLog {
    pub const fn new(
        log: BuildLog,
        manifest: Option<ManifestParse>,
        filter: FilterSettings,
        blocker_epsilon: TimeDelta,
    ) -> Self {
        Self {
            log,
            manifest,
            filter,
            blocker_epsilon,
        }
    }

    /// Reads and parses the files named in `args`.
    pub fn load(args: &LogArgs, config: &Config) -> Result<Self> {
        let text = read_log_text(&args.log)?;
        let log = BuildLog::parse(&text)
            .with_context(|| format!("failed to parse {}", args.log.display()))?;

        let manifest = args
            .deps
            .as_deref()
            .map(|path| {
                parse_manifest_file(path)
                    .with_context(|| format!("failed to read {}", path.display()))
            })
            .transpose()?;

        Ok(Self::new(
            log,
            manifest,
            effective_filter(args, config),
            config.blocker_epsilon(),
        ))
    }

    pub fn dependencies(&self) -> &[Dependency] {
        self.manifest
            .as_ref()
            .map(|manifest| manifest.dependencies.as_slice())
            .unwrap_or_default()
    }

    /// The linked project, or `None` when the filter leaves no events.
    pub fn project(&self) -> Result<Option<Project>> {
        match self.log.project(&self.filter, self.dependencies().to_vec()) {
            Ok(project) => Ok(Some(project)),
            Err(e) if e.is_recoverable() => {
                tracing::debug!(error = %e, "filter produced no events");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Configured filter with command-line overrides applied.
pub fn effective_filter(args: &LogArgs, config: &Config) -> FilterSettings {
    let mut filter = config.filter.clone();
    if args.all_types {
        filter.enable_all();
    }
    if let Some(cache) = args.cache {
        filter.cache_visibility = cache;
    }
    filter
}

/// Message printed instead of output when no event survives the filter.
pub(crate) fn write_empty<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "No events for the current filter. Try --all-types or --cache all."
    )?;
    Ok(())
}
