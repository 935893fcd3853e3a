//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use bt_core::FilterSettings;
use bt_core::timeline::BLOCKER_EPSILON_MS;
use chrono::TimeDelta;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Largest accepted blocker sampling offset.
const MAX_BLOCKER_EPSILON_MS: i64 = 60_000;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter applied when no command-line override is given.
    pub filter: FilterSettings,
    /// Offset either side of an event's end used to detect blockers.
    pub blocker_epsilon_ms: i64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("cache_visibility", &self.filter.cache_visibility)
            .field("allowed_types", &self.filter.allowed_types.len())
            .field("blocker_epsilon_ms", &self.blocker_epsilon_ms)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter: FilterSettings::default(),
            blocker_epsilon_ms: BLOCKER_EPSILON_MS,
        }
    }
}

impl Config {
    /// Loads configuration from default locations, then `config_path` if
    /// given.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // BT_BLOCKER_EPSILON_MS, BT_FILTER__CACHE_VISIBILITY, ...
        figment = figment.merge(Env::prefixed("BT_").split("__"));

        figment.extract()
    }

    /// Blocker sampling offset, clamped to `0..=60s`.
    pub fn blocker_epsilon(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.blocker_epsilon_ms.clamp(0, MAX_BLOCKER_EPSILON_MS))
    }
}

/// Returns the platform-specific config directory for bt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bt"))
}
