//! Command handlers.
//!
//! This module contains the Handler trait and the command registry that
//! resolves incoming invocations (actor, command name, args) to handlers,
//! enforcing the descriptor's permission node before anything runs.
//!
//! The registry is built during startup and read-only afterwards, so
//! concurrent dispatch needs no locking.

mod duty;
mod emergency;

pub use duty::{DispatchPriorityHandler, OffDutyHandler, OnDutyHandler, SquireHandler};
pub use emergency::{DispatchHandler, FreezeDispatchHandler, ReportEmergencyHandler};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::warn;

use crate::error::{HandlerError, HandlerResult, RegistryError};
use crate::host::{ActorId, DispatchAlert, Outbound, nodes};
use crate::state::Station;
use crate::telemetry::CommandTimer;

/// Middleware for routing handler replies.
/// Direct forwards to the host's alert channel; Capturing buffers for tests.
#[derive(Clone)]
pub enum ResponseSink<'a> {
    Direct(&'a mpsc::Sender<Outbound>),
    Capturing(&'a Mutex<Vec<Outbound>>),
}

impl ResponseSink<'_> {
    /// Send or buffer an alert depending on sink mode.
    pub async fn send(
        &self,
        target: &ActorId,
        alert: DispatchAlert,
    ) -> Result<(), mpsc::error::SendError<Outbound>> {
        let outbound = Outbound {
            target: target.clone(),
            alert,
        };
        match self {
            Self::Direct(tx) => tx.send(outbound).await,
            Self::Capturing(buf) => {
                let mut guard = buf.lock().await;
                guard.push(outbound);
                Ok(())
            }
        }
    }
}

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The actor the command runs on behalf of.
    pub actor: &'a ActorId,
    /// Shared dispatch state.
    pub station: &'a Arc<Station>,
    /// Sink for replies to the invoking actor.
    pub sender: ResponseSink<'a>,
}

/// Trait implemented by all command handlers.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle an invocation. Arguments arrive pre-split by the host router.
    async fn handle(&self, ctx: &mut Context<'_>, args: &[String]) -> HandlerResult;
}

/// Immutable binding of a command name to its permission node and handler.
pub struct CommandDescriptor {
    name: String,
    permission: String,
    handler: Box<dyn Handler>,
}

impl CommandDescriptor {
    pub fn new(name: impl Into<String>, permission: impl Into<String>, handler: Box<dyn Handler>) -> Self {
        Self {
            name: name.into(),
            permission: permission.into(),
            handler,
        }
    }

    /// Descriptor for a built-in command, gated by its
    /// `sneakydispatch.command.<name>` node.
    fn builtin(name: &str, handler: Box<dyn Handler>) -> Self {
        Self::new(name, nodes::command(name), handler)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }
}

/// Structured result of a dispatch call.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The handler ran to completion.
    Success,
    /// No descriptor registered under that name. Permissions were not queried.
    UnknownCommand(String),
    /// The actor lacks the descriptor's node. The handler was not invoked.
    PermissionDenied { command: String, node: String },
    /// The handler raised; the cause is preserved inside.
    HandlerFailed(HandlerError),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Static code string for log labeling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::UnknownCommand(_) => "unknown_command",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::HandlerFailed(e) => e.error_code(),
        }
    }
}

/// Registry of command handlers.
///
/// Names are unique case-insensitively; lookups fold to ASCII lowercase.
pub struct Registry {
    handlers: HashMap<String, CommandDescriptor>,
    /// Per-command dispatch counters.
    command_counts: HashMap<String, Arc<AtomicU64>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            command_counts: HashMap::new(),
        }
    }

    /// Create a registry with all built-in commands registered.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        // Emergency handlers
        registry.register(CommandDescriptor::builtin(
            "reportemergency",
            Box::new(ReportEmergencyHandler),
        ))?;
        registry.register(CommandDescriptor::builtin("dispatch", Box::new(DispatchHandler)))?;
        registry.register(CommandDescriptor::builtin(
            "freezedispatch",
            Box::new(FreezeDispatchHandler),
        ))?;

        // Duty handlers
        registry.register(CommandDescriptor::builtin("onduty", Box::new(OnDutyHandler)))?;
        registry.register(CommandDescriptor::builtin("offduty", Box::new(OffDutyHandler)))?;
        registry.register(CommandDescriptor::builtin("squire", Box::new(SquireHandler)))?;
        registry.register(CommandDescriptor::builtin(
            "dispatchpriority",
            Box::new(DispatchPriorityHandler),
        ))?;

        Ok(registry)
    }

    /// Add a descriptor. Fails if the name (case-insensitively) exists; the
    /// first registration survives.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        let key = descriptor.name.to_ascii_lowercase();
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::DuplicateCommand(key));
        }
        self.command_counts
            .insert(key.clone(), Arc::new(AtomicU64::new(0)));
        self.handlers.insert(key, descriptor);
        Ok(())
    }

    /// Get dispatch counts per command, most-used first.
    pub fn command_stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(cmd, count)| (cmd.clone(), count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }

    /// Resolve and run a command invocation.
    ///
    /// Single-shot: look up the name (case-insensitive), check the actor
    /// against the descriptor's node, invoke the handler. Handler failures
    /// are caught and reported in the outcome; they never unwind past here.
    pub async fn dispatch(
        &self,
        ctx: &mut Context<'_>,
        command: &str,
        args: &[String],
    ) -> DispatchOutcome {
        let key = command.to_ascii_lowercase();

        let Some(descriptor) = self.handlers.get(&key) else {
            return DispatchOutcome::UnknownCommand(command.to_string());
        };

        if !ctx
            .station
            .permissions
            .has_permission(ctx.actor, &descriptor.permission)
        {
            return DispatchOutcome::PermissionDenied {
                command: key,
                node: descriptor.permission.clone(),
            };
        }

        // Counters are created for every descriptor in register(), so a miss
        // here is a registry logic error.
        let counter = self
            .command_counts
            .get(&key)
            .expect("command counter missing for registered handler");
        counter.fetch_add(1, Ordering::Relaxed);

        let _timer = CommandTimer::new(key.as_str());
        match descriptor.handler.handle(ctx, args).await {
            Ok(()) => DispatchOutcome::Success,
            Err(e) => {
                warn!(command = %key, actor = %ctx.actor, code = e.error_code(), error = %e, "handler failed");
                DispatchOutcome::HandlerFailed(e)
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
