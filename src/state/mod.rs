//! State management module.
//!
//! Contains the Station (shared dispatch state) and its two halves: the
//! emergency board and the unit roster.

mod board;
mod roster;
mod station;

pub use board::{BoardEntry, DispatchBoard, DispatchTicket, Emergency, EmergencyCategory};
pub use roster::{LeaveOutcome, UnitRoster};
pub use station::Station;
