//! Engine and store settings, loaded from TOML.
//!
//! ```toml
//! max_generations_before_ending = 10000
//! stable_population_iterations = 10
//!
//! [store]
//! dir = "boards"
//! ttl_secs = 86400
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::sparselife::StabilityLimits;

/// Environment variable naming the settings file when no path is given.
pub const CONFIG_ENV: &str = "SPARSE_LIFE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables consumed by the stability run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Hard upper bound on generations evaluated by `end` before it fails.
    pub max_generations_before_ending: u64,
    /// Consecutive unchanged population samples, per period, that count as
    /// stable.
    pub stable_population_iterations: u32,
}

impl EngineConfig {
    pub fn new(max_generations_before_ending: u64, stable_population_iterations: u32) -> Self {
        Self {
            max_generations_before_ending,
            stable_population_iterations,
        }
    }

    /// Replace the generation bound.
    pub fn max_generations(mut self, n: u64) -> Self {
        self.max_generations_before_ending = n;
        self
    }

    /// Replace the stability threshold.
    pub fn stable_iterations(mut self, n: u32) -> Self {
        self.stable_population_iterations = n;
        self
    }

    pub fn stability_limits(&self) -> StabilityLimits {
        StabilityLimits {
            max_generations: self.max_generations_before_ending,
            stable_iterations: self.stable_population_iterations,
        }
    }
}

/// Where and how long boards are kept. Only the CLI reads this.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSettings {
    /// Root directory for the file store; `None` keeps boards in memory.
    pub dir: Option<PathBuf>,
    /// Board lifetime in seconds; `None` keeps boards until ended.
    pub ttl_secs: Option<u64>,
}

impl StoreSettings {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub engine: EngineConfig,
    pub store: StoreSettings,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    #[serde(alias = "maxGenerationsBeforeEnding")]
    max_generations_before_ending: Option<u64>,
    #[serde(alias = "stablePopulationIterations")]
    stable_population_iterations: Option<u32>,
    #[serde(default)]
    store: StoreSettings,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = toml::from_str(text)?;
        let engine = EngineConfig {
            max_generations_before_ending: raw
                .max_generations_before_ending
                .ok_or(ConfigError::Missing("max_generations_before_ending"))?,
            stable_population_iterations: raw
                .stable_population_iterations
                .ok_or(ConfigError::Missing("stable_population_iterations"))?,
        };
        Ok(Self {
            engine,
            store: raw.store,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
