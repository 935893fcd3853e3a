//! Parser for Xcode's target dependency graph dump (`*-targetGraph.txt`).
//!
//! The file looks like:
//!
//! ```text
//! Target dependency graph (3 targets)
//! Target 'App' in project 'App'
//! ➜ Explicit dependency on target 'Core' in project 'App'
//! ➜ Implicit dependency on target 'Utils' in project 'App' via options '-framework Utils'
//! Target 'Core' in project 'App' (no dependencies)
//! ```
//!
//! Each dependency line belongs to the closest target header above it.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::BuildLogError;

static GRAPH_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Target dependency graph\b").unwrap());
static TARGET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Target '([^']+)' in project '[^']*'").unwrap());
static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^➜\s*(Explicit|Implicit) dependency on target '([^']+)' in project '[^']*'")
        .unwrap()
});

/// An edge of the target graph: `to` waits for `from`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub from: String,
    pub to: String,
    /// Explicit dependencies always block; implicit ones are inferred by the
    /// build system from linked products.
    pub critical: bool,
}

/// Result of reading a manifest. Unreadable lines degrade to fewer edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestParse {
    pub dependencies: Vec<Dependency>,
    /// Dependency lines that could not be attributed or did not match.
    pub skipped_lines: usize,
}

impl ManifestParse {
    /// Whether some dependency lines were lost.
    pub const fn is_partial(&self) -> bool {
        self.skipped_lines > 0
    }
}

/// Parses the text of a target graph dump.
pub fn parse_manifest(text: &str) -> ManifestParse {
    let mut parse = ManifestParse::default();
    let mut current_target: Option<&str> = None;

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || GRAPH_HEADER_RE.is_match(line) {
            continue;
        }

        if let Some(caps) = TARGET_RE.captures(line) {
            current_target = caps.get(1).map(|m| m.as_str());
            continue;
        }

        if !line.starts_with('➜') {
            tracing::trace!(line = index + 1, "ignoring unrecognized manifest line");
            continue;
        }

        let edge = DEPENDENCY_RE.captures(line).zip(current_target);
        let Some((caps, target)) = edge else {
            tracing::debug!(line = index + 1, text = line, "skipping dependency line");
            parse.skipped_lines += 1;
            continue;
        };

        parse.dependencies.push(Dependency {
            from: caps[2].to_string(),
            to: target.to_string(),
            critical: &caps[1] == "Explicit",
        });
    }

    if parse.is_partial() {
        tracing::warn!(
            skipped = parse.skipped_lines,
            parsed = parse.dependencies.len(),
            "dependency manifest partially parsed"
        );
    }

    parse
}

/// Reads and parses a manifest file.
pub fn parse_manifest_file(path: &Path) -> Result<ManifestParse, BuildLogError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_manifest(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
Target dependency graph (3 targets)
Target 'App' in project 'App'
➜ Explicit dependency on target 'Core' in project 'App'
➜ Implicit dependency on target 'Utils' in project 'Shared' via options '-framework Utils' in build setting 'OTHER_LDFLAGS'
Target 'Core' in project 'App'
➜ Explicit dependency on target 'Utils' in project 'Shared'
Target 'Utils' in project 'Shared' (no dependencies)
";

    fn edge(from: &str, to: &str, critical: bool) -> Dependency {
        Dependency {
            from: from.to_string(),
            to: to.to_string(),
            critical,
        }
    }

    #[test]
    fn parses_explicit_and_implicit_edges() {
        let parse = parse_manifest(MANIFEST);
        assert_eq!(
            parse.dependencies,
            vec![
                edge("Core", "App", true),
                edge("Utils", "App", false),
                edge("Utils", "Core", true),
            ]
        );
        assert!(!parse.is_partial());
    }

    #[test]
    fn unknown_lines_are_ignored() {
        let text = "note: something\n\nTarget 'A' in project 'P'\nrandom noise\n";
        let parse = parse_manifest(text);
        assert!(parse.dependencies.is_empty());
        assert_eq!(parse.skipped_lines, 0);
    }

    #[test]
    fn malformed_dependency_lines_are_counted() {
        let text = "\
➜ Explicit dependency on target 'Orphan' in project 'P'
Target 'A' in project 'P'
➜ Explicit dependency on 'B'
➜ Explicit dependency on target 'C' in project 'P'
";
        let parse = parse_manifest(text);
        assert_eq!(parse.dependencies, vec![edge("C", "A", true)]);
        assert_eq!(parse.skipped_lines, 2);
        assert!(parse.is_partial());
    }

    #[test]
    fn tolerates_indentation_and_crlf() {
        let text = "Target 'A' in project 'P'\r\n    ➜ Implicit dependency on target 'B' in project 'P'\r\n";
        let parse = parse_manifest(text);
        assert_eq!(parse.dependencies, vec![edge("B", "A", false)]);
    }

    #[test]
    fn reads_manifest_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc-targetGraph.txt");
        std::fs::write(&path, MANIFEST).unwrap();

        let parse = parse_manifest_file(&path).unwrap();
        assert_eq!(parse.dependencies.len(), 3);

        let err = parse_manifest_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, BuildLogError::Io(_)));
    }
}
