//! The Station: shared state handed to every command handler.
//!
//! Owns the board and the roster, plus the host handles (permission store,
//! outbound alert channel) injected at startup. Handlers reach everything
//! through an `Arc<Station>`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::Config;
use crate::error::HandlerError;
use crate::host::{ActorId, DispatchAlert, Outbound, Permissions, nodes};
use crate::state::{DispatchBoard, Emergency, UnitRoster};

pub struct Station {
    pub config: Config,
    pub board: DispatchBoard,
    pub roster: UnitRoster,
    pub permissions: Arc<dyn Permissions>,
    pub alerts: mpsc::Sender<Outbound>,
}

impl Station {
    pub fn new(
        config: Config,
        permissions: Arc<dyn Permissions>,
        alerts: mpsc::Sender<Outbound>,
    ) -> Self {
        let board = DispatchBoard::new(&config);
        let roster = UnitRoster::new(config.dispatch.unit_disband_size);
        Self {
            config,
            board,
            roster,
            permissions,
            alerts,
        }
    }

    /// Send one alert to one actor.
    pub async fn alert(&self, target: &ActorId, alert: DispatchAlert) -> Result<(), HandlerError> {
        self.alerts
            .send(Outbound {
                target: target.clone(),
                alert,
            })
            .await?;
        Ok(())
    }

    /// Fan an alert out to every on-duty responder, optionally skipping one.
    pub async fn alert_paladins(
        &self,
        alert: DispatchAlert,
        except: Option<&ActorId>,
    ) -> Result<(), HandlerError> {
        for paladin in self.roster.paladins() {
            if Some(&paladin) == except {
                continue;
            }
            self.alert(&paladin, alert.clone()).await?;
        }
        Ok(())
    }

    /// Put an emergency on the board and alert the roster.
    pub async fn report_emergency(&self, emergency: Emergency) -> Result<(), HandlerError> {
        let name = emergency.name().to_string();
        self.board.report(emergency)?;
        self.alert_paladins(DispatchAlert::EmergencyReported { emergency: name }, None)
            .await
    }

    /// Run a report scheduled earlier; failures are logged, not raised,
    /// since the caller is long gone.
    pub async fn report_emergency_delayed(self: Arc<Self>, delay: Duration, emergency: Emergency) {
        tokio::time::sleep(delay).await;
        if let Err(e) = self.report_emergency(emergency).await {
            warn!(code = e.error_code(), error = %e, "delayed emergency report dropped");
        }
    }

    /// Responders idle past the configured threshold.
    pub fn idle_paladins(&self) -> usize {
        let never_idle = nodes::never_idle();
        let limit = Duration::from_secs(self.config.dispatch.paladin_idle_minutes * 60);
        self.roster
            .idle_paladins(|a| self.permissions.has_permission(a, &never_idle), limit)
    }
}
