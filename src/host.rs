//! Host-facing interfaces.
//!
//! The dispatch core runs embedded in a host process (the thing that owns
//! actors and routes their commands). Everything the core consumes from the
//! host lives here: the permission store seam, the opaque actor identity,
//! and the structured alerts the core emits back through the host's
//! outbound channel.

use std::fmt;

use crate::state::BoardEntry;

/// Plugin identifier. All permission nodes are prefixed with this.
pub const IDENTIFIER: &str = "sneakydispatch";

/// Permission node constructors.
///
/// Node layout follows `<identifier>.<node>` with per-command nodes under
/// `<identifier>.command.<name>`.
pub mod nodes {
    use super::IDENTIFIER;

    /// Blanket node granting everything.
    pub fn wildcard() -> String {
        format!("{IDENTIFIER}.*")
    }

    /// Blanket node granting every command.
    pub fn command_wildcard() -> String {
        format!("{IDENTIFIER}.command.*")
    }

    /// Node gating a single command.
    pub fn command(name: &str) -> String {
        format!("{IDENTIFIER}.command.{name}")
    }

    /// Marks an actor as an on-duty responder.
    pub fn on_duty() -> String {
        format!("{IDENTIFIER}.onduty")
    }

    /// Holders are never counted as idle (and exempt their unit).
    pub fn never_idle() -> String {
        format!("{IDENTIFIER}.neveridle")
    }

    /// Holders may dispatch past an emergency's cap.
    pub fn supervisor() -> String {
        format!("{IDENTIFIER}.supervisor")
    }
}

/// Opaque actor identity supplied by the host.
///
/// The core never interprets the contents; it only compares, hashes, and
/// forwards it back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Permission store interface consumed from the host.
///
/// Implementations must be cheap to call: `has_permission` sits on the
/// dispatch path for every command.
pub trait Permissions: Send + Sync {
    /// Whether `actor` holds `node`.
    fn has_permission(&self, actor: &ActorId, node: &str) -> bool;

    /// Declare a node to the host at startup.
    fn register_permission(&self, node: &str);
}

/// A structured alert addressed to one actor.
///
/// The host renders these however it likes (chat line, toast, console).
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub target: ActorId,
    pub alert: DispatchAlert,
}

/// Everything the core says to actors.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchAlert {
    /// The caller's report was accepted (possibly scheduled for later).
    ReportAccepted { delay_ms: Option<u64> },
    /// A new emergency is on the board; sent to every on-duty responder.
    EmergencyReported { emergency: String },
    /// Current board listing, sent to the caller of `dispatch`.
    Board { entries: Vec<BoardEntry> },
    /// The caller was dispatched to an emergency.
    DispatchedSelf { emergency: String },
    /// Another responder was dispatched; sent to the rest of the roster.
    DispatchedOther {
        emergency: String,
        responder: ActorId,
        dispatched: u32,
        cap: u32,
    },
    /// The board was frozen.
    Frozen { minutes: u64 },
    /// The recipient is now on duty.
    OnDuty,
    /// The recipient is now off duty.
    OffDuty,
    /// Someone joined the recipient's unit.
    MemberJoined { who: ActorId },
    /// Someone left the recipient's unit.
    MemberLeft { who: ActorId },
    /// The recipient's unit fell below the disband size and was dissolved.
    UnitDisbanded,
    /// The caller's unit priority changed.
    PrioritySet { priority: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_layout() {
        assert_eq!(nodes::wildcard(), "sneakydispatch.*");
        assert_eq!(nodes::command_wildcard(), "sneakydispatch.command.*");
        assert_eq!(nodes::command("dispatch"), "sneakydispatch.command.dispatch");
        assert_eq!(nodes::supervisor(), "sneakydispatch.supervisor");
    }

    #[test]
    fn test_actor_id_is_opaque_equality() {
        let a = ActorId::new("alice");
        let b = ActorId::from("alice");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "alice");
    }
}
