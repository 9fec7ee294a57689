use crate::actors::messages::{AppError, TelemetryRecord};
use async_trait::async_trait;

/// Defines the destination of analytics records.
///
/// This trait abstracts the transport so the analytics actor can be driven by
/// the HTTP endpoint in production and by in-memory sinks in tests.
#[async_trait]
pub trait AnalyticsSink: Send + Sync + 'static {
    /// Delivers a single record. Called at most once per record; never retried.
    async fn send(&self, record: &TelemetryRecord) -> Result<(), AppError>;
}
