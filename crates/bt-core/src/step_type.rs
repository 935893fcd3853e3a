//! Detail step categories as the single source of truth for their string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a build step, classified from its section signature.
///
/// `None` marks the main and target steps, which carry no command of their
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DetailStepType {
    CCompilation,
    SwiftCompilation,
    ScriptExecution,
    CreateStaticLibrary,
    Linker,
    CopySwiftLibs,
    CompileAssetsCatalog,
    CompileStoryboard,
    WriteAuxiliaryFile,
    LinkStoryboards,
    CopyResourceFile,
    MergeSwiftModule,
    XibCompilation,
    SwiftAggregatedCompilation,
    PrecompileBridgingHeader,
    ValidateEmbeddedBinary,
    Validate,
    Other,
    None,
}

/// Signature prefixes in match order.
///
/// `CompileSwiftSources ` must be tried before `CompileSwift `, and
/// `ValidateEmbeddedBinary ` before `Validate `.
const SIGNATURE_PREFIXES: &[(&str, DetailStepType)] = &[
    ("CompileC ", DetailStepType::CCompilation),
    ("CompileSwiftSources ", DetailStepType::SwiftAggregatedCompilation),
    ("CompileSwift ", DetailStepType::SwiftCompilation),
    ("Ld ", DetailStepType::Linker),
    ("PhaseScriptExecution ", DetailStepType::ScriptExecution),
    ("Libtool ", DetailStepType::CreateStaticLibrary),
    ("CopySwiftLibs ", DetailStepType::CopySwiftLibs),
    ("CompileAssetCatalog ", DetailStepType::CompileAssetsCatalog),
    ("CompileStoryboard ", DetailStepType::CompileStoryboard),
    ("WriteAuxiliaryFile ", DetailStepType::WriteAuxiliaryFile),
    ("LinkStoryboards ", DetailStepType::LinkStoryboards),
    ("CpResource ", DetailStepType::CopyResourceFile),
    ("MergeSwiftModule ", DetailStepType::MergeSwiftModule),
    ("CompileXIB ", DetailStepType::XibCompilation),
    (
        "PrecompileSwiftBridgingHeader ",
        DetailStepType::PrecompileBridgingHeader,
    ),
    ("ValidateEmbeddedBinary ", DetailStepType::ValidateEmbeddedBinary),
    ("Validate ", DetailStepType::Validate),
];

impl DetailStepType {
    pub const ALL: [Self; 19] = [
        Self::CCompilation,
        Self::SwiftCompilation,
        Self::ScriptExecution,
        Self::CreateStaticLibrary,
        Self::Linker,
        Self::CopySwiftLibs,
        Self::CompileAssetsCatalog,
        Self::CompileStoryboard,
        Self::WriteAuxiliaryFile,
        Self::LinkStoryboards,
        Self::CopyResourceFile,
        Self::MergeSwiftModule,
        Self::XibCompilation,
        Self::SwiftAggregatedCompilation,
        Self::PrecompileBridgingHeader,
        Self::ValidateEmbeddedBinary,
        Self::Validate,
        Self::Other,
        Self::None,
    ];

    /// Classifies a detail step by its section signature.
    pub fn from_signature(signature: &str) -> Self {
        SIGNATURE_PREFIXES
            .iter()
            .find(|(prefix, _)| signature.starts_with(*prefix))
            .map_or(Self::Other, |&(_, step_type)| step_type)
    }

    pub const fn is_compilation_step(self) -> bool {
        matches!(
            self,
            Self::CCompilation
                | Self::SwiftCompilation
                | Self::CompileStoryboard
                | Self::XibCompilation
                | Self::CompileAssetsCatalog
                | Self::SwiftAggregatedCompilation
                | Self::PrecompileBridgingHeader
        )
    }

    /// The default filter: every compilation category.
    pub fn compilation_steps() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(|t| t.is_compilation_step())
    }
}

impl fmt::Display for DetailStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CCompilation => "c_compilation",
            Self::SwiftCompilation => "swift_compilation",
            Self::ScriptExecution => "script_execution",
            Self::CreateStaticLibrary => "create_static_library",
            Self::Linker => "linker",
            Self::CopySwiftLibs => "copy_swift_libs",
            Self::CompileAssetsCatalog => "compile_assets_catalog",
            Self::CompileStoryboard => "compile_storyboard",
            Self::WriteAuxiliaryFile => "write_auxiliary_file",
            Self::LinkStoryboards => "link_storyboards",
            Self::CopyResourceFile => "copy_resource_file",
            Self::MergeSwiftModule => "merge_swift_module",
            Self::XibCompilation => "xib_compilation",
            Self::SwiftAggregatedCompilation => "swift_aggregated_compilation",
            Self::PrecompileBridgingHeader => "precompile_bridging_header",
            Self::ValidateEmbeddedBinary => "validate_embedded_binary",
            Self::Validate => "validate",
            Self::Other => "other",
            Self::None => "none",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DetailStepType {
    type Err = UnknownStepType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.to_string() == s)
            .ok_or_else(|| UnknownStepType(s.to_string()))
    }
}

impl Serialize for DetailStepType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DetailStepType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown step type strings.
#[derive(Debug, Clone)]
pub struct UnknownStepType(String);

impl fmt::Display for UnknownStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown step type: {}", self.0)
    }
}

impl std::error::Error for UnknownStepType {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        for variant in DetailStepType::ALL {
            let s = variant.to_string();
            let parsed: DetailStepType = s.parse().expect("should parse");
            assert_eq!(parsed, variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn unknown_type_errors() {
        let err = "compile".parse::<DetailStepType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown step type: compile");
    }

    #[test]
    fn classifies_signatures() {
        let cases = [
            ("CompileC /tmp/a.o a.m normal arm64", DetailStepType::CCompilation),
            ("CompileSwift normal arm64 a.swift", DetailStepType::SwiftCompilation),
            (
                "CompileSwiftSources normal arm64 com.apple.xcode.tools.swift.compiler",
                DetailStepType::SwiftAggregatedCompilation,
            ),
            ("Ld /tmp/App normal", DetailStepType::Linker),
            ("ValidateEmbeddedBinary /tmp/App.app", DetailStepType::ValidateEmbeddedBinary),
            ("Validate /tmp/App.app", DetailStepType::Validate),
            ("CpResource a.png", DetailStepType::CopyResourceFile),
            ("Touch /tmp/App.app", DetailStepType::Other),
            ("", DetailStepType::Other),
        ];
        for (signature, expected) in cases {
            assert_eq!(DetailStepType::from_signature(signature), expected, "{signature}");
        }
    }

    #[test]
    fn prefix_match_requires_trailing_space() {
        assert_eq!(
            DetailStepType::from_signature("CompileCSomething"),
            DetailStepType::Other
        );
    }

    #[test]
    fn compilation_steps_are_the_default_filter() {
        let steps: Vec<_> = DetailStepType::compilation_steps().collect();
        assert_eq!(
            steps,
            vec![
                DetailStepType::CCompilation,
                DetailStepType::SwiftCompilation,
                DetailStepType::CompileAssetsCatalog,
                DetailStepType::CompileStoryboard,
                DetailStepType::XibCompilation,
                DetailStepType::SwiftAggregatedCompilation,
                DetailStepType::PrecompileBridgingHeader,
            ]
        );
        assert!(!DetailStepType::Linker.is_compilation_step());
    }

    #[test]
    fn serializes_as_snake_case_string() {
        let json = serde_json::to_string(&DetailStepType::SwiftCompilation).unwrap();
        assert_eq!(json, "\"swift_compilation\"");
        let back: DetailStepType = serde_json::from_str("\"linker\"").unwrap();
        assert_eq!(back, DetailStepType::Linker);
    }
}
