//! The emergency board: categories, live emergencies, and the freeze switch.
//!
//! Reports land here, responders are dispatched from here, and expired
//! entries are swept off. The board is shared across concurrent dispatch
//! calls, so live emergencies sit in a `DashMap` and the freeze deadline
//! behind a `parking_lot` lock.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use uuid::Uuid;

use crate::config::{CategoryConfig, Config};
use crate::error::HandlerError;
use crate::host::ActorId;

/// Immutable emergency category, built from config at startup.
#[derive(Debug, Clone)]
pub struct EmergencyCategory {
    pub key: String,
    pub name: String,
    pub description: String,
    pub dispatch_cap: u32,
    pub dispatch_par: u32,
    pub duration: Duration,
}

impl EmergencyCategory {
    /// Build from config, coercing out-of-range values to defaults.
    pub fn from_config(key: &str, config: &CategoryConfig) -> Self {
        let dispatch_cap = if config.dispatch_cap >= 1 {
            config.dispatch_cap
        } else {
            warn!(category = %key, "dispatch_cap below 1, using 1");
            1
        };
        let duration_ms = if config.duration_ms > 0 {
            config.duration_ms
        } else {
            warn!(category = %key, "duration_ms is zero, using 600000");
            600_000
        };
        Self {
            key: key.to_string(),
            name: config.name.clone(),
            description: config.description.clone(),
            dispatch_cap,
            dispatch_par: config.dispatch_par,
            duration: Duration::from_millis(duration_ms),
        }
    }
}

/// A live emergency on the board.
#[derive(Debug, Clone)]
pub struct Emergency {
    pub id: Uuid,
    pub category: Arc<EmergencyCategory>,
    pub reporter: ActorId,
    reported_at: Instant,
    dispatched: u32,
}

impl Emergency {
    pub fn new(category: Arc<EmergencyCategory>, reporter: ActorId) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            reporter,
            reported_at: Instant::now(),
            dispatched: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.category.name
    }

    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }

    pub fn is_expired(&self) -> bool {
        self.reported_at.elapsed() >= self.category.duration
    }

    pub fn is_cap_fulfilled(&self) -> bool {
        self.dispatched >= self.category.dispatch_cap
    }

    fn entry(&self) -> BoardEntry {
        BoardEntry {
            id: self.id,
            name: self.category.name.clone(),
            description: self.category.description.clone(),
            dispatched: self.dispatched,
            cap: self.category.dispatch_cap,
            par: self.category.dispatch_par,
        }
    }
}

/// One line of the board listing sent back to a responder.
///
/// `par` is the desired minimum responder count; hosts can render entries
/// still short of it more urgently.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub dispatched: u32,
    pub cap: u32,
    pub par: u32,
}

/// Receipt returned by a successful dispatch, used to build alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchTicket {
    pub emergency: String,
    pub dispatched: u32,
    pub cap: u32,
}

/// The board itself.
pub struct DispatchBoard {
    categories: HashMap<String, Arc<EmergencyCategory>>,
    emergencies: DashMap<Uuid, Emergency>,
    frozen_until: RwLock<Option<Instant>>,
}

impl DispatchBoard {
    /// Build the board with categories from config.
    pub fn new(config: &Config) -> Self {
        let categories = config
            .emergencies
            .iter()
            .map(|(key, c)| (key.clone(), Arc::new(EmergencyCategory::from_config(key, c))))
            .collect();
        Self {
            categories,
            emergencies: DashMap::new(),
            frozen_until: RwLock::new(None),
        }
    }

    /// Look up a category by its config key.
    pub fn category(&self, key: &str) -> Option<Arc<EmergencyCategory>> {
        self.categories.get(key).cloned()
    }

    /// How long the board stays frozen, if it is.
    pub fn frozen_remaining(&self) -> Option<Duration> {
        let until = (*self.frozen_until.read())?;
        let now = Instant::now();
        if until > now { Some(until - now) } else { None }
    }

    /// Freeze the board: reports are rejected until the deadline passes.
    /// Deadlines past what `Instant` can represent clamp to the far future.
    pub fn freeze_for(&self, duration: Duration) {
        let now = Instant::now();
        let until = now
            .checked_add(duration)
            .unwrap_or_else(|| now + Duration::from_secs(u32::MAX as u64));
        *self.frozen_until.write() = Some(until);
    }

    /// Put an emergency on the board. Rejected while frozen.
    pub fn report(&self, emergency: Emergency) -> Result<(), HandlerError> {
        if let Some(remaining) = self.frozen_remaining() {
            return Err(HandlerError::DispatchFrozen {
                remaining_ms: remaining.as_millis() as u64,
            });
        }
        self.emergencies.insert(emergency.id, emergency);
        Ok(())
    }

    /// Record a responder dispatched to `id`.
    ///
    /// The cap blocks further dispatch unless `supervisor` is set. Expired
    /// entries are treated as unknown and removed on the way.
    pub fn dispatch_to(&self, id: Uuid, supervisor: bool) -> Result<DispatchTicket, HandlerError> {
        {
            let Some(mut emergency) = self.emergencies.get_mut(&id) else {
                return Err(HandlerError::UnknownEmergency(id.to_string()));
            };
            if !emergency.is_expired() {
                if emergency.is_cap_fulfilled() && !supervisor {
                    return Err(HandlerError::CapFulfilled);
                }
                emergency.dispatched += 1;
                return Ok(DispatchTicket {
                    emergency: emergency.category.name.clone(),
                    dispatched: emergency.dispatched,
                    cap: emergency.category.dispatch_cap,
                });
            }
        }
        // Expired but not yet swept.
        self.emergencies.remove(&id);
        Err(HandlerError::UnknownEmergency(id.to_string()))
    }

    /// Remove expired emergencies; returns how many were dropped.
    pub fn cleanup(&self) -> usize {
        let before = self.emergencies.len();
        self.emergencies.retain(|_, e| !e.is_expired());
        before - self.emergencies.len()
    }

    /// Snapshot of the current board for a listing reply.
    pub fn entries(&self) -> Vec<BoardEntry> {
        let mut entries: Vec<BoardEntry> = self
            .emergencies
            .iter()
            .filter(|e| !e.is_expired())
            .map(|e| e.entry())
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        entries
    }

    pub fn len(&self) -> usize {
        self.emergencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emergencies.is_empty()
    }
}
