//! Summary command: one screen describing the whole build.

use std::io::Write;

use anyhow::Result;
use bt_core::timeline::{all_periods, blockers, timeline_duration};
use chrono::TimeDelta;

use super::util::format_secs;
use super::{LoadedLog, write_empty};

pub fn run<W: Write>(writer: &mut W, input: &LoadedLog) -> Result<()> {
    writeln!(writer, "{}", input.log.title())?;

    let Some(project) = input.project()? else {
        return write_empty(writer);
    };
    let events = project.events();

    let duration = timeline_duration(events).unwrap_or_else(TimeDelta::zero);
    let peak = all_periods(events)
        .iter()
        .map(|period| period.concurrency)
        .max()
        .unwrap_or(0);
    let blocker_count = blockers(events, input.blocker_epsilon).len();

    writeln!(writer, "events: {}", events.len())?;
    writeln!(writer, "duration: {}", format_secs(duration))?;
    writeln!(writer, "peak concurrency: {peak}")?;
    writeln!(writer, "blockers: {blocker_count}")?;

    match &input.manifest {
        None => writeln!(writer, "dependencies: none")?,
        Some(manifest) => {
            let critical = manifest.dependencies.iter().filter(|d| d.critical).count();
            writeln!(
                writer,
                "dependencies: {} ({critical} critical)",
                manifest.dependencies.len()
            )?;
            if manifest.is_partial() {
                writeln!(writer, "skipped manifest lines: {}", manifest.skipped_lines)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use bt_core::{CacheVisibility, FilterSettings};
    use insta::assert_snapshot;

    use super::*;
    use crate::testutil::sample_input;

    fn render(input: &LoadedLog) -> String {
        let mut output = Vec::new();
        run(&mut output, input).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_summary() {
        let output = render(&sample_input(FilterSettings::default()));
        assert_snapshot!(output, @r"
        Build App
        events: 4
        duration: 8.00s
        peak concurrency: 2
        blockers: 1
        dependencies: 2 (1 critical)
        ");
    }

    #[test]
    fn test_summary_without_manifest() {
        let mut input = sample_input(FilterSettings {
            cache_visibility: CacheVisibility::CurrentBuild,
            ..FilterSettings::default()
        });
        input.manifest = None;
        let output = render(&input);
        assert!(output.contains("events: 3\n"));
        assert!(output.ends_with("dependencies: none\n"));
    }

    #[test]
    fn test_summary_reports_empty_filter() {
        let input = sample_input(FilterSettings {
            cache_visibility: CacheVisibility::Cached,
            allowed_types: [bt_core::DetailStepType::Linker].into(),
        });
        let output = render(&input);
        assert_snapshot!(output, @r"
        Build App
        No events for the current filter. Try --all-types or --cache all.
        ");
    }
}
