//! Events command: list the filtered events in timeline order.

use std::io::Write;

use anyhow::Result;
use bt_core::timeline::timeline_start;

use super::util::{format_offset, format_secs};
use super::{LoadedLog, write_empty};

pub fn run<W: Write>(writer: &mut W, input: &LoadedLog, json: bool) -> Result<()> {
    let Some(project) = input.project()? else {
        return write_empty(writer);
    };
    let events = project.events();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(events)?)?;
        return Ok(());
    }

    let Some(origin) = timeline_start(events) else {
        return write_empty(writer);
    };
    for event in events {
        write!(
            writer,
            "{} {} {}",
            format_offset(event.start_date, origin),
            format_secs(event.duration),
            event.task_name
        )?;
        if event.fetched_from_cache {
            write!(writer, " (cached)")?;
        }
        if !event.parents.is_empty() {
            write!(writer, " <- {}", event.parents.join(", "))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bt_core::FilterSettings;
    use insta::assert_snapshot;

    use super::*;
    use crate::testutil::sample_input;

    #[test]
    fn test_events_text() {
        let mut output = Vec::new();
        run(&mut output, &sample_input(FilterSettings::default()), false).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        +0.00s 3.00s Core
        +0.00s 1.00s Utils (cached)
        +3.00s 1.50s Network
        +5.00s 3.00s App <- Core, Utils
        ");
    }

    #[test]
    fn test_events_json() {
        let mut output = Vec::new();
        run(&mut output, &sample_input(FilterSettings::default()), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();

        let events = value.as_array().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3]["task_name"], "App");
        assert_eq!(events[3]["duration_secs"], 3.0);
        assert_eq!(events[3]["parents"], serde_json::json!(["Core", "Utils"]));
        assert_eq!(events[1]["fetched_from_cache"], true);
        assert!(events[0].get("parents").is_none());
    }

    #[test]
    fn test_events_all_types_extends_core() {
        let mut filter = FilterSettings::default();
        filter.enable_all();
        let mut output = Vec::new();
        run(&mut output, &sample_input(filter), false).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("+0.00s 4.00s Core\n"));
    }
}
