//! Duty command handlers: onduty, offduty, squire, dispatchpriority.

use async_trait::async_trait;
use tracing::info;

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::host::{ActorId, DispatchAlert};
use crate::state::LeaveOutcome;

/// Handler for `onduty [actor...]`.
///
/// Forms a new unit from the caller plus any named actors. Fails if anyone
/// involved is already in a unit.
pub struct OnDutyHandler;

#[async_trait]
impl Handler for OnDutyHandler {
    async fn handle(&self, ctx: &mut Context<'_>, args: &[String]) -> HandlerResult {
        let mut members = vec![ctx.actor.clone()];
        members.extend(args.iter().map(|a| ActorId::new(a.clone())));

        ctx.station.roster.form_unit(members.clone())?;
        info!(actor = %ctx.actor, size = members.len(), "unit formed");

        for member in &members {
            ctx.station.alert(member, DispatchAlert::OnDuty).await?;
        }
        Ok(())
    }
}

/// Handler for `offduty`.
///
/// Removes the caller from their unit; the unit disbands when it falls to
/// or below the configured size, and remaining members are told either way.
pub struct OffDutyHandler;

#[async_trait]
impl Handler for OffDutyHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _args: &[String]) -> HandlerResult {
        let outcome = ctx.station.roster.leave(ctx.actor)?;
        ctx.sender.send(ctx.actor, DispatchAlert::OffDuty).await?;

        match outcome {
            LeaveOutcome::Left { remaining } => {
                info!(actor = %ctx.actor, "went off duty");
                for member in &remaining {
                    ctx.station
                        .alert(
                            member,
                            DispatchAlert::MemberLeft {
                                who: ctx.actor.clone(),
                            },
                        )
                        .await?;
                }
            }
            LeaveOutcome::Disbanded { remaining } => {
                info!(actor = %ctx.actor, "went off duty, unit disbanded");
                for member in &remaining {
                    ctx.station
                        .alert(member, DispatchAlert::UnitDisbanded)
                        .await?;
                }
            }
        }
        Ok(())
    }
}

/// Handler for `squire <actor>`.
///
/// Adds an actor to the caller's unit.
pub struct SquireHandler;

#[async_trait]
impl Handler for SquireHandler {
    async fn handle(&self, ctx: &mut Context<'_>, args: &[String]) -> HandlerResult {
        let Some(name) = args.first() else {
            return Err(HandlerError::InvalidUsage("/squire <actor>"));
        };
        let recruit = ActorId::new(name.clone());

        let existing = ctx.station.roster.add_member(ctx.actor, recruit.clone())?;
        info!(actor = %ctx.actor, recruit = %recruit, "actor squired into unit");

        ctx.station.alert(&recruit, DispatchAlert::OnDuty).await?;
        for member in &existing {
            ctx.station
                .alert(
                    member,
                    DispatchAlert::MemberJoined {
                        who: recruit.clone(),
                    },
                )
                .await?;
        }
        Ok(())
    }
}

/// Handler for `dispatchpriority <priority>`.
///
/// A positive priority resets the unit's idle time to maximum, putting it
/// first in line for the next dispatch.
pub struct DispatchPriorityHandler;

#[async_trait]
impl Handler for DispatchPriorityHandler {
    async fn handle(&self, ctx: &mut Context<'_>, args: &[String]) -> HandlerResult {
        let Some(raw) = args.first() else {
            return Err(HandlerError::InvalidUsage("/dispatchpriority <priority>"));
        };
        let priority = raw.parse::<i32>().map_err(|_| HandlerError::InvalidArgument {
            what: "priority",
            got: raw.clone(),
        })?;

        ctx.station.roster.set_priority(ctx.actor, priority)?;
        info!(actor = %ctx.actor, priority, "unit priority set");

        ctx.sender
            .send(ctx.actor, DispatchAlert::PrioritySet { priority })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ResponseSink;
    use crate::handlers::testutil::{drain, harness};
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_onduty_forms_unit_and_alerts_members() {
        let mut h = harness();
        let alice = ActorId::new("alice");
        let replies = Mutex::new(Vec::new());
        let mut ctx = Context {
            actor: &alice,
            station: &h.station,
            sender: ResponseSink::Capturing(&replies),
        };

        OnDutyHandler
            .handle(&mut ctx, &["bob".to_string()])
            .await
            .unwrap();

        assert!(h.station.roster.has_unit(&alice));
        assert!(h.station.roster.has_unit(&ActorId::new("bob")));

        let alerts = drain(&mut h.alerts_rx);
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|o| o.alert == DispatchAlert::OnDuty));
    }

    #[tokio::test]
    async fn test_onduty_rejects_double_membership() {
        let h = harness();
        let alice = ActorId::new("alice");
        h.station.roster.form_unit(vec![ActorId::new("bob")]).unwrap();

        let replies = Mutex::new(Vec::new());
        let mut ctx = Context {
            actor: &alice,
            station: &h.station,
            sender: ResponseSink::Capturing(&replies),
        };
        let err = OnDutyHandler
            .handle(&mut ctx, &["bob".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::AlreadyInUnit(_)));
        assert!(!h.station.roster.has_unit(&alice));
    }

    #[tokio::test]
    async fn test_offduty_disband_alerts_remaining() {
        // disband size is 1 in the test config.
        let mut h = harness();
        let alice = ActorId::new("alice");
        let bob = ActorId::new("bob");
        h.station
            .roster
            .form_unit(vec![alice.clone(), bob.clone()])
            .unwrap();

        let replies = Mutex::new(Vec::new());
        let mut ctx = Context {
            actor: &alice,
            station: &h.station,
            sender: ResponseSink::Capturing(&replies),
        };
        OffDutyHandler.handle(&mut ctx, &[]).await.unwrap();

        assert_eq!(replies.lock().await[0].alert, DispatchAlert::OffDuty);
        let alerts = drain(&mut h.alerts_rx);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].target, bob);
        assert_eq!(alerts[0].alert, DispatchAlert::UnitDisbanded);
        assert_eq!(h.station.roster.unit_count(), 0);
    }

    #[tokio::test]
    async fn test_offduty_large_unit_survives() {
        let mut h = harness();
        let alice = ActorId::new("alice");
        h.station
            .roster
            .form_unit(vec![alice.clone(), ActorId::new("bob"), ActorId::new("carol")])
            .unwrap();

        let replies = Mutex::new(Vec::new());
        let mut ctx = Context {
            actor: &alice,
            station: &h.station,
            sender: ResponseSink::Capturing(&replies),
        };
        OffDutyHandler.handle(&mut ctx, &[]).await.unwrap();

        let alerts = drain(&mut h.alerts_rx);
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(
            |o| matches!(o.alert, DispatchAlert::MemberLeft { ref who } if *who == alice)
        ));
        assert_eq!(h.station.roster.unit_count(), 1);
    }

    #[tokio::test]
    async fn test_offduty_without_unit() {
        let h = harness();
        let ghost = ActorId::new("ghost");
        let replies = Mutex::new(Vec::new());
        let mut ctx = Context {
            actor: &ghost,
            station: &h.station,
            sender: ResponseSink::Capturing(&replies),
        };
        let err = OffDutyHandler.handle(&mut ctx, &[]).await.unwrap_err();
        assert!(matches!(err, HandlerError::NotInUnit));
    }

    #[tokio::test]
    async fn test_squire_adds_member() {
        let mut h = harness();
        let alice = ActorId::new("alice");
        let bob = ActorId::new("bob");
        h.station
            .roster
            .form_unit(vec![alice.clone(), bob.clone()])
            .unwrap();

        let replies = Mutex::new(Vec::new());
        let mut ctx = Context {
            actor: &alice,
            station: &h.station,
            sender: ResponseSink::Capturing(&replies),
        };
        SquireHandler
            .handle(&mut ctx, &["carol".to_string()])
            .await
            .unwrap();

        let carol = ActorId::new("carol");
        assert!(h.station.roster.has_unit(&carol));
        let alerts = drain(&mut h.alerts_rx);
        // OnDuty to carol, MemberJoined to alice and bob.
        assert_eq!(alerts.len(), 3);
        assert!(alerts.iter().any(|o| o.target == carol && o.alert == DispatchAlert::OnDuty));
        assert_eq!(
            alerts
                .iter()
                .filter(|o| matches!(o.alert, DispatchAlert::MemberJoined { ref who } if *who == carol))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_priority_command() {
        let h = harness();
        let alice = ActorId::new("alice");
        h.station.roster.form_unit(vec![alice.clone()]).unwrap();
        h.station.roster.set_dispatch_time(&alice);
        assert_eq!(h.station.idle_paladins(), 0);

        let replies = Mutex::new(Vec::new());
        let mut ctx = Context {
            actor: &alice,
            station: &h.station,
            sender: ResponseSink::Capturing(&replies),
        };
        DispatchPriorityHandler
            .handle(&mut ctx, &["2".to_string()])
            .await
            .unwrap();

        assert_eq!(
            replies.lock().await[0].alert,
            DispatchAlert::PrioritySet { priority: 2 }
        );
        assert_eq!(h.station.idle_paladins(), 1);

        let err = DispatchPriorityHandler
            .handle(&mut ctx, &["lots".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidArgument { what: "priority", .. }));
    }
}
