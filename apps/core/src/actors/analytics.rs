use crate::actors::messages::{
    ActorError, AnalyticsMessage, AppError, DispatchOutcome, ShutdownReport, TelemetryRecord,
};
use crate::actors::traits::AnalyticsSink;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

// --- Constants ---
const MAILBOX_CAPACITY: usize = 32;
/// Grace period used when every handle is dropped without an explicit shutdown.
const ORPHAN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// A handle to the `AnalyticsActor`.
///
/// Cloneable interface for handing telemetry records to the background actor.
/// Dispatching never waits on the network.
#[derive(Clone)]
pub struct AnalyticsActorHandle {
    sender: mpsc::Sender<AnalyticsMessage>,
}

impl AnalyticsActorHandle {
    /// Spawns the actor around `sink` and returns a handle to it.
    pub fn new<S: AnalyticsSink>(sink: S) -> Self {
        Self::with_capacity(sink, MAILBOX_CAPACITY)
    }

    /// Same as [`new`](Self::new) with an explicit mailbox size.
    pub fn with_capacity<S: AnalyticsSink>(sink: S, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let actor = AnalyticsActorRunner::new(receiver, Arc::new(sink));
        tokio::spawn(async move { actor.run().await });
        Self { sender }
    }

    /// Hands a record to the actor without waiting for delivery.
    ///
    /// The returned ticket resolves to the delivery outcome. Dropping it is
    /// the fire-and-forget path; failures are still logged by the actor.
    pub fn dispatch(&self, record: TelemetryRecord) -> Result<DispatchTicket, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = AnalyticsMessage::Dispatch {
            record,
            responder: send,
        };
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => ActorError::Overloaded("analytics queue is full".to_string()),
            TrySendError::Closed(_) => {
                ActorError::Closed("analytics actor is not running".to_string())
            }
        })?;
        Ok(DispatchTicket { receiver: recv })
    }

    /// Stops the actor, giving in-flight sends up to `grace` to finish.
    #[instrument(skip(self))]
    pub async fn shutdown(&self, grace: Duration) -> Result<ShutdownReport, AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(AnalyticsMessage::Shutdown {
                grace,
                responder: send,
            })
            .await
            .map_err(|e| ActorError::Closed(e.to_string()))?;
        let report = recv.await.map_err(|e| ActorError::Internal(e.to_string()))?;
        Ok(report)
    }
}

/// Completion channel of one dispatched record.
#[derive(Debug)]
pub struct DispatchTicket {
    receiver: oneshot::Receiver<DispatchOutcome>,
}

impl DispatchTicket {
    /// Waits for the delivery outcome.
    ///
    /// A record abandoned at shutdown resolves to `Failed`.
    pub async fn outcome(self) -> DispatchOutcome {
        self.receiver.await.unwrap_or_else(|_| {
            DispatchOutcome::Failed("analytics record abandoned before delivery".to_string())
        })
    }
}

// --- Actor Runner (Internal Logic) ---
struct AnalyticsActorRunner<S: AnalyticsSink> {
    receiver: mpsc::Receiver<AnalyticsMessage>,
    sink: Arc<S>,
}

impl<S: AnalyticsSink> AnalyticsActorRunner<S> {
    fn new(receiver: mpsc::Receiver<AnalyticsMessage>, sink: Arc<S>) -> Self {
        Self { receiver, sink }
    }

    async fn run(mut self) {
        info!("AnalyticsActor started");
        let mut in_flight: FuturesUnordered<BoxFuture<'static, ()>> = FuturesUnordered::new();

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(AnalyticsMessage::Dispatch { record, responder }) => {
                        in_flight.push(self.deliver(record, responder));
                    }
                    Some(AnalyticsMessage::Shutdown { grace, responder }) => {
                        info!("AnalyticsActor shutting down...");
                        // Later dispatches fail fast instead of queueing.
                        self.receiver.close();
                        let report = drain(&mut in_flight, grace).await;
                        let _ = responder.send(report);
                        break;
                    }
                    None => {
                        drain(&mut in_flight, ORPHAN_DRAIN_TIMEOUT).await;
                        break;
                    }
                },
                Some(()) = in_flight.next(), if !in_flight.is_empty() => {}
            }
        }

        info!("AnalyticsActor stopped");
    }

    fn deliver(
        &self,
        record: TelemetryRecord,
        responder: oneshot::Sender<DispatchOutcome>,
    ) -> BoxFuture<'static, ()> {
        let sink = Arc::clone(&self.sink);
        async move {
            let outcome = match sink.send(&record).await {
                Ok(()) => {
                    debug!("Analytics record delivered");
                    DispatchOutcome::Delivered
                }
                Err(e) => {
                    error!("Failed to send analytics data: {}", e);
                    DispatchOutcome::Failed(e.to_string())
                }
            };
            let _ = responder.send(outcome);
        }
        .boxed()
    }
}

async fn drain(
    in_flight: &mut FuturesUnordered<BoxFuture<'static, ()>>,
    grace: Duration,
) -> ShutdownReport {
    let pending = in_flight.len();
    let mut completed = 0;
    let _ = timeout(grace, async {
        while in_flight.next().await.is_some() {
            completed += 1;
        }
    })
    .await;

    let abandoned = pending - completed;
    if abandoned > 0 {
        warn!("Abandoning {} analytics records still in flight", abandoned);
    }
    ShutdownReport {
        completed,
        abandoned,
    }
}

/// Sink posting records as JSON to `{base_url}/analytics`.
pub struct HttpAnalyticsSink {
    client: Client,
    endpoint: Url,
}

impl HttpAnalyticsSink {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, AppError> {
        let endpoint = analytics_endpoint(base_url)?;
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    async fn send(&self, record: &TelemetryRecord) -> Result<(), AppError> {
        self.client
            .post(self.endpoint.clone())
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Appends the `analytics` segment, keeping any base path.
fn analytics_endpoint(base_url: &str) -> Result<Url, AppError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("analytics")?)
}
