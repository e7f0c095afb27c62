//! Emergency command handlers: reportemergency, dispatch, freezedispatch.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::host::{DispatchAlert, nodes};
use crate::state::Emergency;

/// Handler for `reportemergency <category> [delay-ms]`.
///
/// Puts a new emergency on the board (or schedules it when a delay is
/// given) and alerts every on-duty responder.
pub struct ReportEmergencyHandler;

#[async_trait]
impl Handler for ReportEmergencyHandler {
    async fn handle(&self, ctx: &mut Context<'_>, args: &[String]) -> HandlerResult {
        let Some(category_key) = args.first() else {
            return Err(HandlerError::InvalidUsage(
                "/reportemergency <category> [delay-ms]",
            ));
        };
        let category = ctx
            .station
            .board
            .category(category_key)
            .ok_or_else(|| HandlerError::UnknownCategory(category_key.clone()))?;

        let delay_ms = match args.get(1) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| HandlerError::InvalidArgument {
                what: "delay",
                got: raw.clone(),
            })?),
            None => None,
        };

        let emergency = Emergency::new(category, ctx.actor.clone());
        match delay_ms {
            Some(ms) => {
                // The report itself runs later; the freeze check happens at
                // report time, not at scheduling time.
                let station = Arc::clone(ctx.station);
                tokio::spawn(station.report_emergency_delayed(Duration::from_millis(ms), emergency));
                info!(actor = %ctx.actor, category = %category_key, delay_ms = ms, "emergency report scheduled");
            }
            None => {
                ctx.station.report_emergency(emergency).await?;
                info!(actor = %ctx.actor, category = %category_key, "emergency reported");
            }
        }

        ctx.sender
            .send(ctx.actor, DispatchAlert::ReportAccepted { delay_ms })
            .await?;
        Ok(())
    }
}

/// Handler for `dispatch [emergency-id]`.
///
/// Without arguments, sweeps expired entries and replies with the board
/// listing. With an id, dispatches the calling actor to that emergency;
/// the cap blocks non-supervisors.
pub struct DispatchHandler;

#[async_trait]
impl Handler for DispatchHandler {
    async fn handle(&self, ctx: &mut Context<'_>, args: &[String]) -> HandlerResult {
        let Some(raw_id) = args.first() else {
            ctx.station.board.cleanup();
            let entries = ctx.station.board.entries();
            ctx.sender
                .send(ctx.actor, DispatchAlert::Board { entries })
                .await?;
            return Ok(());
        };

        let id = Uuid::parse_str(raw_id).map_err(|_| HandlerError::InvalidArgument {
            what: "emergency id",
            got: raw_id.clone(),
        })?;

        let supervisor = ctx
            .station
            .permissions
            .has_permission(ctx.actor, &nodes::supervisor());
        let ticket = ctx.station.board.dispatch_to(id, supervisor)?;
        ctx.station.roster.set_dispatch_time(ctx.actor);

        info!(
            actor = %ctx.actor,
            emergency = %ticket.emergency,
            dispatched = ticket.dispatched,
            cap = ticket.cap,
            "responder dispatched"
        );

        ctx.sender
            .send(
                ctx.actor,
                DispatchAlert::DispatchedSelf {
                    emergency: ticket.emergency.clone(),
                },
            )
            .await?;
        ctx.station
            .alert_paladins(
                DispatchAlert::DispatchedOther {
                    emergency: ticket.emergency,
                    responder: ctx.actor.clone(),
                    dispatched: ticket.dispatched,
                    cap: ticket.cap,
                },
                Some(ctx.actor),
            )
            .await?;
        Ok(())
    }
}

/// Handler for `freezedispatch <minutes>`.
pub struct FreezeDispatchHandler;

#[async_trait]
impl Handler for FreezeDispatchHandler {
    async fn handle(&self, ctx: &mut Context<'_>, args: &[String]) -> HandlerResult {
        let Some(raw) = args.first() else {
            return Err(HandlerError::InvalidUsage("/freezedispatch <minutes>"));
        };
        let minutes = raw.parse::<u64>().map_err(|_| HandlerError::InvalidArgument {
            what: "minutes",
            got: raw.clone(),
        })?;
        let duration = minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| HandlerError::InvalidArgument {
                what: "minutes",
                got: raw.clone(),
            })?;

        ctx.station.board.freeze_for(duration);
        info!(actor = %ctx.actor, minutes, "dispatch frozen");

        ctx.sender
            .send(ctx.actor, DispatchAlert::Frozen { minutes })
            .await?;
        Ok(())
    }
}
