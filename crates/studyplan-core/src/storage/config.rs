//! TOML-based application configuration.
//!
//! Stores planning defaults:
//! - Phase weights for the calendar allocator
//! - Default weekly study hours
//! - Autosave coalescing window for phase saves
//!
//! Configuration is stored at `~/.config/studyplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::plan::{PhaseWeights, PHASE_COUNT};

/// Calendar allocation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Percentage weights for the four preparation phases. Must sum to 100;
    /// a file that does not is rejected on load, never renormalized.
    #[serde(default = "default_phase_weights")]
    pub phase_weights: [u32; PHASE_COUNT],
    #[serde(default = "default_weekly_hours")]
    pub default_weekly_hours: u32,
}

/// Client-side save coalescing.
///
/// Callers batch partial saves within this window before hitting storage.
/// This is caller policy only: the core tolerates any save frequency with no
/// behavioral difference from a single save of the final payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
}

// Default functions
fn default_phase_weights() -> [u32; PHASE_COUNT] {
    [10, 40, 30, 20]
}
fn default_weekly_hours() -> u32 {
    10
}
fn default_debounce_ms() -> u64 {
    1500
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            phase_weights: default_phase_weights(),
            default_weekly_hours: default_weekly_hours(),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            autosave: AutosaveConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default path, falling back to defaults when no file
    /// exists yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// carries weights that do not sum to 100.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate a configuration file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.phase_weights()?;
        Ok(config)
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The configured allocator weights, validated.
    pub fn phase_weights(&self) -> Result<PhaseWeights, ConfigError> {
        PhaseWeights::new(self.planner.phase_weights)
    }
}

fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
        path: PathBuf::from("config.toml"),
        message: e.to_string(),
    })?;
    Ok(dir.join("config.toml"))
}
