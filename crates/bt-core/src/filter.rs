//! Which build steps survive into events.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::build_step::BuildStep;
use crate::step_type::DetailStepType;

/// How steps restored from the build cache are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheVisibility {
    /// Show cached and freshly built steps.
    #[default]
    All,
    /// Show only steps fetched from cache.
    Cached,
    /// Show only work done by this build; cached targets disappear.
    CurrentBuild,
}

impl CacheVisibility {
    /// Whether a step with the given cache flag is visible.
    pub const fn shows(self, fetched_from_cache: bool) -> bool {
        match self {
            Self::All => true,
            Self::Cached => fetched_from_cache,
            Self::CurrentBuild => !fetched_from_cache,
        }
    }
}

impl fmt::Display for CacheVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Cached => "cached",
            Self::CurrentBuild => "current-build",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CacheVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "cached" => Ok(Self::Cached),
            "current-build" => Ok(Self::CurrentBuild),
            _ => Err(format!(
                "unknown cache visibility '{s}' (expected all, cached or current-build)"
            )),
        }
    }
}

/// Filter policy applied when turning the step tree into events.
///
/// Defaults to every compilation category with cached steps shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub cache_visibility: CacheVisibility,
    pub allowed_types: BTreeSet<DetailStepType>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            cache_visibility: CacheVisibility::default(),
            allowed_types: DetailStepType::compilation_steps().collect(),
        }
    }
}

impl FilterSettings {
    /// Allows every step category.
    pub fn enable_all(&mut self) {
        self.allowed_types = DetailStepType::ALL.into_iter().collect();
    }

    pub fn add(&mut self, step_type: DetailStepType) {
        self.allowed_types.insert(step_type);
    }

    /// Removing a category that is not allowed is a no-op.
    pub fn remove(&mut self, step_type: DetailStepType) {
        self.allowed_types.remove(&step_type);
    }

    pub fn allows(&self, step_type: DetailStepType) -> bool {
        self.allowed_types.contains(&step_type)
    }

    /// Whether `step` becomes a child event of its target.
    ///
    /// Steps that claim to start before the build itself are dropped; stale
    /// entries in real logs do this.
    pub fn admits(&self, step: &BuildStep, build_start: DateTime<Utc>) -> bool {
        self.allows(step.detail_step_type)
            && step.start_date > build_start
            && self.cache_visibility.shows(step.fetched_from_cache)
    }

    /// Whether a whole target is hidden regardless of its steps.
    pub const fn hides_target(&self, target: &BuildStep) -> bool {
        matches!(self.cache_visibility, CacheVisibility::CurrentBuild) && target.fetched_from_cache
    }
}
