use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::oneshot;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// The actor's mailbox is full; the message was not enqueued.
    #[error("Actor mailbox full: {0}")]
    Overloaded(String),
    /// The actor has stopped and no longer accepts messages.
    #[error("Actor stopped: {0}")]
    Closed(String),
    /// A generic internal error within an actor.
    #[error("Internal system error: {0}")]
    Internal(String),
    /// An error indicating that an actor operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for ActorError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ActorError::Timeout(format!("Actor operation timed out: {}", err))
    }
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Body posted to the analytics endpoint for every chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// The raw user input
    pub input: String,
    /// The response shown to the user
    pub response: String,
}

/// Final state of one analytics dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DispatchOutcome {
    Delivered,
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered)
    }
}

/// What happened to in-flight records when the actor was shut down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Sends that finished (either way) during the grace period
    pub completed: usize,
    /// Sends still pending when the grace period ran out
    pub abandoned: usize,
}

/// Messages that can be sent to the `AnalyticsActor`.
#[derive(Debug)]
pub enum AnalyticsMessage {
    /// Deliver one record in the background.
    Dispatch {
        record: TelemetryRecord,
        /// A channel to report the delivery outcome back. May be closed.
        responder: oneshot::Sender<DispatchOutcome>,
    },
    /// Stop accepting records and wait up to `grace` for in-flight sends.
    Shutdown {
        grace: Duration,
        responder: oneshot::Sender<ShutdownReport>,
    },
}
