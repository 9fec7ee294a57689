//! Interaction loop.
//!
//! One chat session over an input/output pair, modeled as an explicit state
//! machine:
//!
//! ```text
//! WaitingForInput --line--> Processing --reply written--> WaitingForInput
//!        |
//!        +--EOF / quit / exit--> Terminated
//! ```
//!
//! Each turn is independent. Analytics dispatch happens after the reply is
//! written and is never awaited.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, instrument, warn};

use crate::actors::{AnalyticsActorHandle, TelemetryRecord};
use crate::brain::{normalize, TurnAnalyzer, UserTurn};
use crate::error::AppError;

pub const WELCOME_MESSAGE: &str = "Welcome to our chatbot! How can I assist you today?";
pub const PROMPT: &str = ">> ";
pub const FAREWELL_MESSAGE: &str = "Goodbye!";

/// Normalized inputs that end the session
const QUIT_COMMANDS: &[&str] = &["quit", "exit"];

/// State of the interaction loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    WaitingForInput,
    /// Holds the raw line being processed
    Processing(String),
    Terminated,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Turns answered
    pub turns: usize,
    /// Records handed to the analytics actor
    pub dispatched: usize,
    /// Records the analytics actor could not accept
    pub dropped: usize,
}

pub fn is_quit_command(line: &str) -> bool {
    let normalized = normalize(line);
    QUIT_COMMANDS.contains(&normalized.as_str())
}

pub struct ChatSession {
    analyzer: TurnAnalyzer,
    analytics: AnalyticsActorHandle,
    state: LoopState,
    summary: SessionSummary,
}

impl ChatSession {
    pub fn new(analyzer: TurnAnalyzer, analytics: AnalyticsActorHandle) -> Self {
        Self {
            analyzer,
            analytics,
            state: LoopState::WaitingForInput,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Drives the loop until EOF or a quit command.
    #[instrument(skip_all)]
    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> Result<SessionSummary, AppError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Chat session started");
        write_line(&mut output, WELCOME_MESSAGE).await?;
        let mut buf = Vec::new();

        loop {
            let state = std::mem::replace(&mut self.state, LoopState::Terminated);
            self.state = match state {
                LoopState::Terminated => break,
                LoopState::WaitingForInput => {
                    output.write_all(PROMPT.as_bytes()).await?;
                    output.flush().await?;
                    match read_line_lossy(&mut input, &mut buf).await? {
                        None => LoopState::Terminated,
                        Some(line) if is_quit_command(&line) => {
                            write_line(&mut output, FAREWELL_MESSAGE).await?;
                            LoopState::Terminated
                        }
                        Some(line) => LoopState::Processing(line),
                    }
                }
                LoopState::Processing(raw) => {
                    let turn = self.analyzer.analyze(&raw);
                    self.reply(&turn, &mut output).await?;
                    self.report(turn);
                    LoopState::WaitingForInput
                }
            };
        }

        info!(
            turns = self.summary.turns,
            dispatched = self.summary.dispatched,
            dropped = self.summary.dropped,
            "Chat session ended"
        );
        Ok(self.summary)
    }

    async fn reply<W: AsyncWrite + Unpin>(
        &mut self,
        turn: &UserTurn,
        output: &mut W,
    ) -> Result<(), AppError> {
        write_line(output, turn.reaction()).await?;
        write_line(output, &turn.response).await?;
        self.summary.turns += 1;
        Ok(())
    }

    /// Fire-and-forget: the ticket is dropped, the actor logs failures.
    fn report(&mut self, turn: UserTurn) {
        let turn_id = turn.id;
        let record = TelemetryRecord {
            input: turn.raw_input,
            response: turn.response,
        };
        match self.analytics.dispatch(record) {
            Ok(_ticket) => self.summary.dispatched += 1,
            Err(e) => {
                warn!(turn_id = %turn_id, "Analytics record dropped: {}", e);
                self.summary.dropped += 1;
            }
        }
    }
}

/// Next line without its `\n` or `\r\n` ending, `None` at EOF.
///
/// Invalid UTF-8 is replaced rather than rejected so one garbled line
/// cannot end the session.
async fn read_line_lossy<R: AsyncBufRead + Unpin>(
    input: &mut R,
    buf: &mut Vec<u8>,
) -> Result<Option<String>, AppError> {
    buf.clear();
    if input.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<(), AppError> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
