//! Interaction loop tests.
//!
//! Sessions run over in-memory input and output; analytics goes to mock
//! sinks so delivery success, failure and hangs are all deterministic.

use crate::actors::messages::{AppError, TelemetryRecord};
use crate::actors::traits::AnalyticsSink;
use crate::actors::AnalyticsActorHandle;
use crate::brain::{KnowledgeBase, KnowledgeEntry, TurnAnalyzer, FALLBACK_RESPONSE};
use crate::session::{ChatSession, LoopState, FAREWELL_MESSAGE, PROMPT, WELCOME_MESSAGE};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{timeout, Duration};

// --- Mock Sinks ---

#[derive(Clone, Default)]
struct RecordingSink {
    records: Arc<Mutex<Vec<TelemetryRecord>>>,
}

#[async_trait]
impl AnalyticsSink for RecordingSink {
    async fn send(&self, record: &TelemetryRecord) -> Result<(), AppError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FailingSink {
    attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl AnalyticsSink for FailingSink {
    async fn send(&self, _record: &TelemetryRecord) -> Result<(), AppError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Http("simulated network failure".to_string()))
    }
}

/// Never completes, like a request to an endpoint that never answers.
struct HangingSink;

#[async_trait]
impl AnalyticsSink for HangingSink {
    async fn send(&self, _record: &TelemetryRecord) -> Result<(), AppError> {
        std::future::pending::<Result<(), AppError>>().await
    }
}

// --- Test Setup ---

fn analyzer() -> TurnAnalyzer {
    TurnAnalyzer::new(Arc::new(KnowledgeBase::new(vec![
        KnowledgeEntry::new(["hello"], "Hi!"),
        KnowledgeEntry::new(["hello", "bye"], "Later!"),
    ])))
}

async fn run_session(
    analytics: AnalyticsActorHandle,
    input: &str,
) -> (ChatSession, crate::session::SessionSummary, String) {
    run_session_bytes(analytics, input.as_bytes()).await
}

async fn run_session_bytes(
    analytics: AnalyticsActorHandle,
    input: &[u8],
) -> (ChatSession, crate::session::SessionSummary, String) {
    let mut session = ChatSession::new(analyzer(), analytics);
    let mut output = Vec::new();
    let summary = timeout(Duration::from_secs(5), session.run(input, &mut output))
        .await
        .expect("session blocked")
        .expect("session failed");
    (session, summary, String::from_utf8(output).unwrap())
}

// --- Tests ---

#[tokio::test]
async fn test_transcript_and_telemetry() {
    let sink = RecordingSink::default();
    let analytics = AnalyticsActorHandle::new(sink.clone());

    let (session, summary, transcript) =
        run_session(analytics.clone(), "Hello there\nI hate waiting\nquit\n").await;

    let expected = format!(
        "{welcome}\n{p}I see.\nHi!\n{p}I'm sorry to hear that.\n{fallback}\n{p}{bye}\n",
        welcome = WELCOME_MESSAGE,
        p = PROMPT,
        fallback = FALLBACK_RESPONSE,
        bye = FAREWELL_MESSAGE,
    );
    assert_eq!(transcript, expected);
    assert_eq!(summary.turns, 2);
    assert_eq!(summary.dispatched, 2);
    assert_eq!(summary.dropped, 0);
    assert_eq!(session.state(), &LoopState::Terminated);

    let report = analytics.shutdown(Duration::from_secs(1)).await.unwrap();
    assert_eq!(report.abandoned, 0);

    let mut records = sink.records.lock().unwrap().clone();
    records.sort_by(|a, b| a.input.cmp(&b.input));
    assert_eq!(
        records,
        vec![
            TelemetryRecord {
                input: "Hello there".to_string(),
                response: "Hi!".to_string(),
            },
            TelemetryRecord {
                input: "I hate waiting".to_string(),
                response: FALLBACK_RESPONSE.to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_eof_terminates_without_farewell() {
    let analytics = AnalyticsActorHandle::new(RecordingSink::default());
    let (session, summary, transcript) = run_session(analytics, "hello").await;

    assert_eq!(summary.turns, 1);
    assert_eq!(session.state(), &LoopState::Terminated);
    assert!(transcript.ends_with(PROMPT));
    assert!(!transcript.contains(FAREWELL_MESSAGE));
}

#[tokio::test]
async fn test_invalid_utf8_line_does_not_end_session() {
    let sink = RecordingSink::default();
    let analytics = AnalyticsActorHandle::new(sink.clone());

    let (session, summary, transcript) =
        run_session_bytes(analytics.clone(), b"caf\xe9\r\nhello\nquit\n").await;

    assert_eq!(summary.turns, 2);
    assert_eq!(session.state(), &LoopState::Terminated);
    assert!(transcript.contains(&format!("{}\n", FALLBACK_RESPONSE)));
    assert!(transcript.contains("Hi!\n"));
    assert!(transcript.ends_with(&format!("{}\n", FAREWELL_MESSAGE)));

    analytics.shutdown(Duration::from_secs(1)).await.unwrap();
    let records = sink.records.lock().unwrap().clone();
    assert!(records.iter().any(|r| r.input == "caf\u{fffd}"));
    assert!(records.iter().any(|r| r.input == "hello"));
}

#[tokio::test]
async fn test_empty_line_gets_fallback() {
    let analytics = AnalyticsActorHandle::new(RecordingSink::default());
    let (_, summary, transcript) = run_session(analytics, "\nexit\n").await;

    assert_eq!(summary.turns, 1);
    assert!(transcript.contains(&format!("I see.\n{}\n", FALLBACK_RESPONSE)));
}

#[tokio::test]
async fn test_analytics_failure_does_not_stop_loop() {
    let sink = FailingSink::default();
    let analytics = AnalyticsActorHandle::new(sink.clone());

    let (_, summary, transcript) =
        run_session(analytics.clone(), "hello\nhello\nhello\n").await;

    // Every turn answered, and the loop prompted again after each one.
    assert_eq!(summary.turns, 3);
    assert_eq!(summary.dispatched, 3);
    assert_eq!(transcript.matches(PROMPT).count(), 4);
    assert_eq!(transcript.matches("Hi!\n").count(), 3);
    assert!(!transcript.contains("simulated network failure"));

    let report = analytics.shutdown(Duration::from_secs(1)).await.unwrap();
    assert_eq!(report.abandoned, 0);
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_hanging_analytics_does_not_block_next_read() {
    let analytics = AnalyticsActorHandle::new(HangingSink);

    let (_, summary, transcript) =
        run_session(analytics.clone(), "hello\nbye\nquit\n").await;

    assert_eq!(summary.turns, 2);
    assert!(transcript.contains("Later!"));
    assert!(transcript.ends_with(&format!("{}\n", FAREWELL_MESSAGE)));

    let report = analytics.shutdown(Duration::from_millis(50)).await.unwrap();
    assert_eq!(report.completed, 0);
    assert_eq!(report.abandoned, 2);
}

#[tokio::test]
async fn test_stopped_analytics_drops_records_quietly() {
    let analytics = AnalyticsActorHandle::new(RecordingSink::default());
    analytics.shutdown(Duration::from_millis(10)).await.unwrap();

    let (_, summary, transcript) = run_session(analytics, "hello\nquit\n").await;

    assert_eq!(summary.turns, 1);
    assert_eq!(summary.dispatched, 0);
    assert_eq!(summary.dropped, 1);
    assert!(transcript.contains("Hi!"));
}
