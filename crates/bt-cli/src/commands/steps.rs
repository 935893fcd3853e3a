//! Steps command: detail step counts per category.

use std::io::Write;

use anyhow::Result;

use super::LoadedLog;

/// Lists every category present in the log; `[x]` marks those the filter
/// keeps.
pub fn run<W: Write>(writer: &mut W, input: &LoadedLog) -> Result<()> {
    let counts = input.log.step_counts();
    if counts.is_empty() {
        writeln!(writer, "No detail steps.")?;
        return Ok(());
    }

    for (step_type, count) in counts {
        let mark = if input.filter.allows(step_type) { "x" } else { " " };
        writeln!(writer, "[{mark}] {step_type} {count}")?;
    }
    Ok(())
}
