//! Integration test common infrastructure.
//!
//! Provides a host stand-in: an in-memory permission store and a captured
//! alert channel, plus a started plugin writing its config to a temp dir.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use sneakydispatch::{ActorId, HostServices, Outbound, Permissions, SneakyDispatch};

/// In-memory permission store.
#[derive(Default)]
pub struct TestPermissions {
    grants: Mutex<HashSet<(ActorId, String)>>,
    registered: Mutex<Vec<String>>,
}

impl TestPermissions {
    pub fn grant(&self, actor: &ActorId, node: &str) {
        self.grants.lock().insert((actor.clone(), node.to_string()));
    }

    pub fn registered_nodes(&self) -> Vec<String> {
        self.registered.lock().clone()
    }
}

impl Permissions for TestPermissions {
    fn has_permission(&self, actor: &ActorId, node: &str) -> bool {
        self.grants
            .lock()
            .contains(&(actor.clone(), node.to_string()))
    }

    fn register_permission(&self, node: &str) {
        self.registered.lock().push(node.to_string());
    }
}

pub struct TestHost {
    pub plugin: SneakyDispatch,
    pub perms: Arc<TestPermissions>,
    pub alerts: mpsc::Receiver<Outbound>,
    // Keeps the config dir alive for the plugin's lifetime.
    _dir: tempfile::TempDir,
}

impl TestHost {
    /// Start the plugin against the default (auto-created) config.
    pub fn start() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        Self::start_in(dir)
    }

    pub fn start_in(dir: tempfile::TempDir) -> Self {
        sneakydispatch::telemetry::init();
        let perms = Arc::new(TestPermissions::default());
        let (tx, rx) = mpsc::channel(256);
        let plugin = SneakyDispatch::on_start(HostServices {
            permissions: perms.clone(),
            alerts: tx,
            config_path: dir.path().join("config.toml"),
        })
        .expect("plugin start");
        Self {
            plugin,
            perms,
            alerts: rx,
            _dir: dir,
        }
    }

    /// Grant every command node to `actor`.
    pub fn grant_commands(&self, actor: &ActorId, names: &[&str]) {
        for name in names {
            self.perms
                .grant(actor, &sneakydispatch::nodes::command(name));
        }
    }

    /// Drain everything currently buffered on the alert channel.
    pub fn drain_alerts(&mut self) -> Vec<Outbound> {
        let mut out = Vec::new();
        while let Ok(o) = self.alerts.try_recv() {
            out.push(o);
        }
        out
    }
}
