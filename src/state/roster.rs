//! The unit roster: who is on duty, in which unit, and how idle they are.
//!
//! A unit is a group of responders that went on duty together. Actors can
//! belong to at most one unit. Idle time is measured from the last dispatch
//! stamp; an actor with no stamp is maximally idle, which puts fresh units
//! first in line.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::HandlerError;
use crate::host::ActorId;

#[derive(Debug)]
struct Unit {
    members: Vec<ActorId>,
    priority: i32,
}

/// What happened when an actor left their unit.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    /// The unit survives with `remaining` members.
    Left { remaining: Vec<ActorId> },
    /// The unit fell to or below the disband size and was dissolved.
    Disbanded { remaining: Vec<ActorId> },
}

/// All on-duty units plus per-actor dispatch stamps.
pub struct UnitRoster {
    units: RwLock<Vec<Unit>>,
    dispatch_times: RwLock<HashMap<ActorId, Instant>>,
    disband_size: usize,
}

impl UnitRoster {
    pub fn new(disband_size: usize) -> Self {
        Self {
            units: RwLock::new(Vec::new()),
            dispatch_times: RwLock::new(HashMap::new()),
            disband_size,
        }
    }

    /// Form a new unit. Fails if any member is already in one.
    ///
    /// Duplicate names in the input collapse to one membership.
    pub fn form_unit(&self, members: Vec<ActorId>) -> Result<(), HandlerError> {
        let mut deduped: Vec<ActorId> = Vec::with_capacity(members.len());
        for m in members {
            if !deduped.contains(&m) {
                deduped.push(m);
            }
        }

        let mut units = self.units.write();
        for m in &deduped {
            if units.iter().any(|u| u.members.contains(m)) {
                return Err(HandlerError::AlreadyInUnit(m.clone()));
            }
        }
        units.push(Unit {
            members: deduped,
            priority: 0,
        });
        Ok(())
    }

    /// Whether `actor` is in any unit.
    pub fn has_unit(&self, actor: &ActorId) -> bool {
        self.units.read().iter().any(|u| u.members.contains(actor))
    }

    /// Remove `actor` from their unit, disbanding it when it falls to or
    /// below the disband size.
    pub fn leave(&self, actor: &ActorId) -> Result<LeaveOutcome, HandlerError> {
        let mut units = self.units.write();
        let Some(idx) = units.iter().position(|u| u.members.contains(actor)) else {
            return Err(HandlerError::NotInUnit);
        };

        units[idx].members.retain(|m| m != actor);
        let remaining = units[idx].members.clone();
        if remaining.len() <= self.disband_size {
            units.remove(idx);
            Ok(LeaveOutcome::Disbanded { remaining })
        } else {
            Ok(LeaveOutcome::Left { remaining })
        }
    }

    /// Add `recruit` to the unit `sponsor` belongs to.
    ///
    /// Returns the members that were already in the unit, for notification.
    pub fn add_member(
        &self,
        sponsor: &ActorId,
        recruit: ActorId,
    ) -> Result<Vec<ActorId>, HandlerError> {
        let mut units = self.units.write();
        if units.iter().any(|u| u.members.contains(&recruit)) {
            return Err(HandlerError::AlreadyInUnit(recruit));
        }
        let Some(unit) = units.iter_mut().find(|u| u.members.contains(sponsor)) else {
            return Err(HandlerError::NotInUnit);
        };
        let existing = unit.members.clone();
        unit.members.push(recruit);
        Ok(existing)
    }

    /// Every on-duty responder, across all units.
    pub fn paladins(&self) -> Vec<ActorId> {
        self.units
            .read()
            .iter()
            .flat_map(|u| u.members.iter().cloned())
            .collect()
    }

    pub fn unit_count(&self) -> usize {
        self.units.read().len()
    }

    /// Current priority of `actor`'s unit.
    pub fn priority_of(&self, actor: &ActorId) -> Option<i32> {
        self.units
            .read()
            .iter()
            .find(|u| u.members.contains(actor))
            .map(|u| u.priority)
    }

    /// Stamp `actor` as just dispatched.
    pub fn set_dispatch_time(&self, actor: &ActorId) {
        self.dispatch_times
            .write()
            .insert(actor.clone(), Instant::now());
    }

    /// Set the priority of `actor`'s unit.
    ///
    /// A positive priority clears the members' dispatch stamps, resetting
    /// the unit's idle time to maximum so it is next in line.
    pub fn set_priority(&self, actor: &ActorId, priority: i32) -> Result<(), HandlerError> {
        let mut units = self.units.write();
        let Some(unit) = units.iter_mut().find(|u| u.members.contains(actor)) else {
            return Err(HandlerError::NotInUnit);
        };
        unit.priority = priority;
        if priority > 0 {
            let mut times = self.dispatch_times.write();
            for m in &unit.members {
                times.remove(m);
            }
        }
        Ok(())
    }

    /// Count responders in units that have been idle longer than `limit`.
    ///
    /// A unit is ineligible when any member matches `never_idle`; ineligible
    /// units contribute zero. A unit's idle time is measured from its least
    /// recently dispatched member, so the whole unit counts as idle once any
    /// member sits past the limit; members without a stamp count as
    /// maximally idle.
    pub fn idle_paladins<F>(&self, never_idle: F, limit: Duration) -> usize
    where
        F: Fn(&ActorId) -> bool,
    {
        let units = self.units.read();
        let times = self.dispatch_times.read();

        units
            .iter()
            .map(|unit| {
                if unit.members.iter().any(&never_idle) {
                    return 0;
                }
                let idle = unit
                    .members
                    .iter()
                    .map(|m| times.get(m).map(Instant::elapsed).unwrap_or(Duration::MAX))
                    .max()
                    .unwrap_or(Duration::MAX);
                if idle > limit { unit.members.len() } else { 0 }
            })
            .sum()
    }
}
