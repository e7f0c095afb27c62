//! Unified error handling for sneakydispatch.
//!
//! Runtime failures are converted into typed results at the dispatcher
//! boundary; nothing unwinds past it. Startup failures (bad config,
//! duplicate registration) halt initialization instead.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::host::{ActorId, Outbound};

/// Errors raised by command handlers.
///
/// These are caught by the registry and reported to the caller as
/// [`DispatchOutcome::HandlerFailed`](crate::handlers::DispatchOutcome); the
/// original cause stays attached for diagnostics.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid usage: {0}")]
    InvalidUsage(&'static str),

    #[error("'{0}' is not a valid emergency category")]
    UnknownCategory(String),

    #[error("no such emergency: {0}")]
    UnknownEmergency(String),

    #[error("dispatch is frozen for another {remaining_ms} ms")]
    DispatchFrozen { remaining_ms: u64 },

    #[error("emergency already has a full dispatch roster")]
    CapFulfilled,

    #[error("not in an active unit")]
    NotInUnit,

    #[error("{0} is already in a unit")]
    AlreadyInUnit(ActorId),

    #[error("invalid value for {what}: '{got}'")]
    InvalidArgument { what: &'static str, got: String },

    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Outbound>),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUsage(_) => "invalid_usage",
            Self::UnknownCategory(_) => "unknown_category",
            Self::UnknownEmergency(_) => "unknown_emergency",
            Self::DispatchFrozen { .. } => "dispatch_frozen",
            Self::CapFulfilled => "cap_fulfilled",
            Self::NotInUnit => "not_in_unit",
            Self::AlreadyInUnit(_) => "already_in_unit",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Send(_) => "send_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Registration-time errors. Fatal to startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command already registered: {0}")]
    DuplicateCommand(String),
}

/// Errors that halt `on_start`.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("invalid configuration: {}", format_validation(.0))]
    Validation(Vec<crate::config::ValidationError>),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn format_validation(errors: &[crate::config::ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_codes() {
        assert_eq!(
            HandlerError::UnknownCategory("fire".into()).error_code(),
            "unknown_category"
        );
        assert_eq!(HandlerError::CapFulfilled.error_code(), "cap_fulfilled");
        assert_eq!(
            HandlerError::Internal(anyhow::anyhow!("boom")).error_code(),
            "internal_error"
        );
    }

    #[test]
    fn test_internal_error_preserves_cause() {
        let cause = anyhow::anyhow!("handler exploded");
        let err = HandlerError::Internal(cause);
        assert!(err.to_string().contains("handler exploded"));
    }

    #[test]
    fn test_duplicate_command_message_names_the_command() {
        let err = RegistryError::DuplicateCommand("dispatch".into());
        assert_eq!(err.to_string(), "command already registered: dispatch");
    }
}
