//! UserTurn - everything derived from one line of user input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sentiment::{SentimentLabel, SentimentScore};

/// One processed input. Created per loop iteration and dropped afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTurn {
    /// Correlation id used in log records
    pub id: Uuid,
    pub received_at: DateTime<Utc>,

    /// Input exactly as typed
    pub raw_input: String,
    /// Lowercased, trimmed input
    pub normalized_input: String,
    pub tokens: Vec<String>,

    pub sentiment: SentimentScore,
    pub label: SentimentLabel,

    /// Matched response or the fallback text
    pub response: String,
    /// Position of the matched knowledge entry, `None` for the fallback
    pub matched_entry: Option<usize>,
}

impl UserTurn {
    /// The sentiment reaction line printed before the response.
    pub fn reaction(&self) -> &'static str {
        self.label.reaction()
    }

    pub fn is_fallback(&self) -> bool {
        self.matched_entry.is_none()
    }
}
