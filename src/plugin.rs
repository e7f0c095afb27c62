//! Plugin lifecycle: startup, shutdown, and the dispatch entry point.
//!
//! The host constructs [`SneakyDispatch`] once via [`SneakyDispatch::on_start`]
//! and passes it to whatever routes commands; there is no global singleton.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{Config, validate};
use crate::error::StartupError;
use crate::handlers::{Context, DispatchOutcome, Registry, ResponseSink};
use crate::host::{ActorId, Outbound, Permissions, nodes};
use crate::state::Station;

/// Everything the host injects at startup.
pub struct HostServices {
    /// The host's permission store.
    pub permissions: Arc<dyn Permissions>,
    /// Channel the core sends alerts and replies through.
    pub alerts: mpsc::Sender<Outbound>,
    /// Where the config file lives (created with defaults if absent).
    pub config_path: PathBuf,
}

/// The plugin instance: registry, station, and the expiry sweeper.
pub struct SneakyDispatch {
    registry: Registry,
    station: Arc<Station>,
    sweeper: Option<JoinHandle<()>>,
}

impl SneakyDispatch {
    /// Start the plugin: declare permission nodes, load or create the
    /// config, build the station and command registry, and spawn the
    /// expired-emergency sweeper.
    ///
    /// Must be called within a tokio runtime.
    pub fn on_start(host: HostServices) -> Result<Self, StartupError> {
        for node in [
            nodes::wildcard(),
            nodes::command_wildcard(),
            nodes::on_duty(),
            nodes::never_idle(),
            nodes::supervisor(),
        ] {
            host.permissions.register_permission(&node);
        }

        let config = Config::load_or_create(&host.config_path)?;
        validate(&config).map_err(StartupError::Validation)?;
        info!(
            categories = config.emergencies.len(),
            "starting sneakydispatch"
        );

        let station = Arc::new(Station::new(config, host.permissions, host.alerts));
        let registry = Registry::standard()?;
        let sweeper = spawn_sweep_task(Arc::clone(&station));

        Ok(Self {
            registry,
            station,
            sweeper: Some(sweeper),
        })
    }

    /// Entry point the host's command router calls per invocation.
    pub async fn dispatch(
        &self,
        actor: &ActorId,
        command: &str,
        args: &[String],
    ) -> DispatchOutcome {
        let mut ctx = Context {
            actor,
            station: &self.station,
            sender: ResponseSink::Direct(&self.station.alerts),
        };
        self.registry.dispatch(&mut ctx, command, args).await
    }

    /// Stop the plugin: abort the sweeper and let state drop with `self`.
    pub fn on_stop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
        info!("sneakydispatch stopped");
    }

    pub fn station(&self) -> &Arc<Station> {
        &self.station
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Drop for SneakyDispatch {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

/// Periodically sweep expired emergencies off the board.
fn spawn_sweep_task(station: Arc<Station>) -> JoinHandle<()> {
    let period = std::time::Duration::from_secs(station.config.dispatch.sweep_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick fires immediately; skip it.
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = station.board.cleanup();
            if removed > 0 {
                debug!(removed, "swept expired emergencies");
            }
        }
    })
}
