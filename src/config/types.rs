//! Core configuration types and loading.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use super::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Emergency categories, keyed by the id actors use when reporting.
    #[serde(default)]
    pub emergencies: HashMap<String, CategoryConfig>,
    /// Dispatch tuning.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, writing the embedded default file first if none
    /// exists at `path`.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, super::DEFAULT_CONFIG)?;
            info!(path = %path.display(), "wrote default configuration");
        }
        Self::load(path)
    }
}

/// One emergency category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    /// Display name.
    pub name: String,
    /// Shown on the board listing.
    #[serde(default)]
    pub description: String,
    /// Maximum responders dispatched before the cap blocks further dispatch.
    /// Values below 1 are coerced to 1 at startup.
    #[serde(default = "defaults::default_dispatch_cap")]
    pub dispatch_cap: u32,
    /// Desired minimum responder count.
    #[serde(default)]
    pub dispatch_par: u32,
    /// How long the emergency stays on the board, in milliseconds.
    /// Zero is coerced to the default at startup.
    #[serde(default = "defaults::default_duration_ms")]
    pub duration_ms: u64,
}

/// Dispatch tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Minutes without a dispatch before a responder counts as idle.
    #[serde(default = "defaults::default_idle_minutes")]
    pub paladin_idle_minutes: u64,
    /// Units at or below this size are dissolved when a member leaves.
    #[serde(default = "defaults::default_unit_disband_size")]
    pub unit_disband_size: usize,
    /// Seconds between sweeps of expired emergencies.
    #[serde(default = "defaults::default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            paladin_idle_minutes: defaults::default_idle_minutes(),
            unit_disband_size: defaults::default_unit_disband_size(),
            sweep_interval_secs: defaults::default_sweep_interval_secs(),
        }
    }
}
