//! Placeholder expansion for host-side status displays.
//!
//! The host can surface live dispatch stats (scoreboards, tab lists, status
//! lines) by asking for a placeholder by key. Unknown keys return `None` so
//! the host can fall through to its own expansions.

use crate::state::Station;

/// Expand a placeholder key against current station state.
///
/// Supported keys: `paladins_on_duty`, `paladins_idle`,
/// `dispatch_frozen_millis`.
pub fn expand(station: &Station, key: &str) -> Option<String> {
    match key.to_ascii_lowercase().as_str() {
        "paladins_on_duty" => Some(station.roster.paladins().len().to_string()),
        "paladins_idle" => Some(station.idle_paladins().to_string()),
        "dispatch_frozen_millis" => {
            let millis = station
                .board
                .frozen_remaining()
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            Some(millis.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::harness;
    use crate::host::ActorId;
    use std::time::Duration;

    #[test]
    fn test_unknown_key_falls_through() {
        let h = harness();
        assert_eq!(expand(&h.station, "nearby_emergency"), None);
    }

    #[test]
    fn test_roster_counts() {
        let h = harness();
        assert_eq!(expand(&h.station, "paladins_on_duty").unwrap(), "0");

        h.station
            .roster
            .form_unit(vec![ActorId::new("alice"), ActorId::new("bob")])
            .unwrap();
        assert_eq!(expand(&h.station, "PALADINS_ON_DUTY").unwrap(), "2");
        // No dispatch stamps yet: everyone idle.
        assert_eq!(expand(&h.station, "paladins_idle").unwrap(), "2");
    }

    #[test]
    fn test_frozen_millis() {
        let h = harness();
        assert_eq!(expand(&h.station, "dispatch_frozen_millis").unwrap(), "0");

        h.station.board.freeze_for(Duration::from_secs(60));
        let millis: u64 = expand(&h.station, "dispatch_frozen_millis")
            .unwrap()
            .parse()
            .unwrap();
        assert!(millis > 0 && millis <= 60_000);
    }
}
