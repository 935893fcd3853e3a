//! Periods command: how many events ran over each stretch of the build.

use std::io::Write;

use anyhow::Result;
use bt_core::timeline::{all_periods, timeline_start};

use super::util::format_offset;
use super::{LoadedLog, write_empty};

pub fn run<W: Write>(writer: &mut W, input: &LoadedLog, json: bool) -> Result<()> {
    let Some(project) = input.project()? else {
        return write_empty(writer);
    };
    let events = project.events();
    let periods = all_periods(events);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&periods)?)?;
        return Ok(());
    }

    let Some(origin) = timeline_start(events) else {
        return write_empty(writer);
    };
    for period in &periods {
        writeln!(
            writer,
            "{}..{} {}",
            format_offset(period.start, origin),
            format_offset(period.end, origin),
            period.concurrency
        )?;
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
    fn test_periods_text() {
        let mut output = Vec::new();
        run(&mut output, &sample_input(FilterSettings::default()), false).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        +0.00s..+1.00s 2
        +1.00s..+2.00s 1
        +2.00s..+3.00s 1
        +3.00s..+4.50s 1
        +4.50s..+5.00s 0
        +5.00s..+8.00s 1
        ");
    }

    #[test]
    fn test_periods_json() {
        let mut output = Vec::new();
        run(&mut output, &sample_input(FilterSettings::default()), true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();

        let periods = value.as_array().unwrap();
        assert_eq!(periods.len(), 6);
        assert_eq!(periods[0]["concurrency"], 2);
        assert_eq!(periods[4]["concurrency"], 0);
    }
}
