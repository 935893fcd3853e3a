//! Blockers command: events whose end let queued work start.

use std::io::Write;

use anyhow::Result;
use bt_core::timeline::{blockers, timeline_start};

use super::util::format_offset;
use super::{LoadedLog, write_empty};

pub fn run<W: Write>(writer: &mut W, input: &LoadedLog) -> Result<()> {
    let Some(project) = input.project()? else {
        return write_empty(writer);
    };
    let events = project.events();
    let Some(origin) = timeline_start(events) else {
        return write_empty(writer);
    };

    let found = blockers(events, input.blocker_epsilon);
    if found.is_empty() {
        writeln!(writer, "No blockers.")?;
        return Ok(());
    }

    for blocker in found {
        write!(
            writer,
            "{} ends {}",
            blocker.task_name,
            format_offset(blocker.end_date(), origin)
        )?;
        let gated: Vec<&str> = events
            .iter()
            .filter(|event| project.is_blocked_by(event, blocker))
            .map(|event| event.task_name.as_str())
            .collect();
        if !gated.is_empty() {
            write!(writer, ", gates {}", gated.join(", "))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
