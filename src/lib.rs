//! sneakydispatch - permission-gated emergency dispatch core.
//!
//! Actors report emergencies, on-duty responder units get alerted and
//! dispatched to them, and every command runs through a registry that
//! enforces a permission node before the handler sees anything.
//!
//! The crate is host-agnostic: the embedding process supplies a
//! [`Permissions`] store and an outbound alert channel, calls
//! [`SneakyDispatch::on_start`], and routes command invocations to
//! [`SneakyDispatch::dispatch`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod placeholders;
pub mod plugin;
pub mod state;
pub mod telemetry;

pub use error::{HandlerError, HandlerResult, RegistryError, StartupError};
pub use handlers::{CommandDescriptor, Context, DispatchOutcome, Handler, Registry, ResponseSink};
pub use host::{ActorId, DispatchAlert, IDENTIFIER, Outbound, Permissions, nodes};
pub use plugin::{HostServices, SneakyDispatch};
pub use state::{BoardEntry, DispatchBoard, Emergency, EmergencyCategory, Station, UnitRoster};
