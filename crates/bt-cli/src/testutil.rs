//! Sample build shared by command tests.

use bt_core::activity::{ActivityLog, LogSection};
use bt_core::{BuildLog, FilterSettings, parse_manifest};

use crate::commands::LoadedLog;

pub const MANIFEST: &str = "\
Target dependency graph (4 targets)
Target 'App' in project 'App'
➜ Explicit dependency on target 'Core' in project 'App'
➜ Implicit dependency on target 'Utils' in project 'App' via options '-framework Utils'
Target 'Core' in project 'App' (no dependencies)
";

fn section(
    title: &'static str,
    signature: &'static str,
    start: f64,
    stop: f64,
    sub_sections: Vec<LogSection<'static>>,
) -> LogSection<'static> {
    LogSection {
        title,
        signature,
        time_started_recording: start,
        time_stopped_recording: stop,
        sub_sections,
        ..LogSection::default()
    }
}

fn cached(mut section: LogSection<'static>) -> LogSection<'static> {
    section.was_fetched_from_cache = true;
    section
}

/// Four targets: `Core` finishes right before `Network` starts, `Utils`
/// comes from the cache and `App` depends on `Core` and `Utils`.
pub fn sample_slf() -> String {
    let core = section(
        "Build target Core",
        "",
        1.0,
        5.0,
        vec![
            section("Compile a.swift", "CompileSwift normal arm64 a.swift", 1.0, 3.0, vec![]),
            section("Compile b.m", "CompileC b.o b.m", 2.0, 4.0, vec![]),
            section("Link Core", "Ld Core normal", 4.0, 5.0, vec![]),
        ],
    );
    let utils = cached(section(
        "Build target Utils",
        "",
        1.0,
        2.0,
        vec![cached(section(
            "Compile u.swift",
            "CompileSwift normal arm64 u.swift",
            1.0,
            2.0,
            vec![],
        ))],
    ));
    let network = section(
        "Build target Network",
        "",
        4.0,
        5.5,
        vec![section("Compile n.swift", "CompileSwift normal arm64 n.swift", 4.0, 5.5, vec![])],
    );
    let app = section(
        "Build target App",
        "",
        6.0,
        9.0,
        vec![section("Compile main.swift", "CompileSwift normal arm64 main.swift", 6.0, 9.0, vec![])],
    );

    ActivityLog {
        version: 10,
        main_section: section("Build App", "", 0.0, 20.0, vec![core, utils, network, app]),
    }
    .to_slf()
}

/// The sample build with its manifest, under `filter`.
pub fn sample_input(filter: FilterSettings) -> LoadedLog {
    let log = BuildLog::parse(&sample_slf()).unwrap();
    LoadedLog::new(
        log,
        Some(parse_manifest(MANIFEST)),
        filter,
        bt_core::timeline::blocker_epsilon(),
    )
}
