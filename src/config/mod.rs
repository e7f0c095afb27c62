//! Configuration loading and management.
//!
//! Split into logical submodules:
//! - [`types`]: core config structs (Config, DispatchConfig, CategoryConfig)
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup validation that reports all errors found

mod defaults;
mod types;
mod validation;

pub use types::{CategoryConfig, Config, ConfigError, DispatchConfig};
pub use validation::{ValidationError, validate};

/// Default configuration written by [`Config::load_or_create`] when no file
/// exists yet.
pub const DEFAULT_CONFIG: &str = r#"# SneakyDispatch configuration.

[dispatch]
# Minutes without a dispatch before a responder counts as idle.
paladin_idle_minutes = 20
# Units at or below this size are dissolved when a member leaves.
unit_disband_size = 1
# Seconds between sweeps of expired emergencies.
sweep_interval_secs = 60

[emergencies.brawl]
name = "Tavern Brawl"
description = "A brawl has broken out"
dispatch_cap = 3
dispatch_par = 2
duration_ms = 600000

[emergencies.fire]
name = "Structure Fire"
description = "A building is on fire"
dispatch_cap = 6
dispatch_par = 4
duration_ms = 900000
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_and_validates() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("default config must parse");
        assert_eq!(config.dispatch.paladin_idle_minutes, 20);
        assert_eq!(config.emergencies.len(), 2);
        assert!(validate(&config).is_ok());
    }
}
