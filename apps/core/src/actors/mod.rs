//! Background actors. Each actor is a Tokio task owning its state, reached
//! through a cloneable handle wrapping an `mpsc::Sender`.

pub mod analytics;
pub mod messages;
pub mod traits;

pub use analytics::{AnalyticsActorHandle, DispatchTicket, HttpAnalyticsSink};
pub use messages::{ActorError, DispatchOutcome, ShutdownReport, TelemetryRecord};
pub use traits::AnalyticsSink;
