//! Telemetry utilities: command timing and subscriber setup.

use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Initialize a fmt subscriber with env-filter for embedding hosts that
/// don't bring their own. Safe to call more than once; later calls are
/// no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .try_init();
}

/// Guard for timing command execution.
///
/// Logs command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed_us = self.start.elapsed().as_micros() as u64;
        tracing::debug!(command = %self.command, elapsed_us, "command handled");
    }
}
