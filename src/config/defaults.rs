//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

pub fn default_dispatch_cap() -> u32 {
    1
}

pub fn default_duration_ms() -> u64 {
    600_000
}

pub fn default_idle_minutes() -> u64 {
    20
}

pub fn default_unit_disband_size() -> usize {
    1
}

pub fn default_sweep_interval_secs() -> u64 {
    60
}
