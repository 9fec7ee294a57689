//! Turn Analyzer - runs normalization, sentiment, tokenization and matching
//! for one input line.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::knowledge::{KnowledgeBase, FALLBACK_RESPONSE};
use super::normalizer::normalize;
use super::sentiment::{SentimentClassifier, SentimentScorer};
use super::tokenizer::{Tokenizer, WordTokenizer};
use super::turn::UserTurn;

/// Stateless per-turn pipeline over a shared knowledge base.
pub struct TurnAnalyzer {
    knowledge: Arc<KnowledgeBase>,
    classifier: SentimentClassifier,
    tokenizer: Box<dyn Tokenizer>,
}

impl TurnAnalyzer {
    /// Analyzer with the bundled lexicon scorer and word tokenizer
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            knowledge,
            classifier: SentimentClassifier::new(),
            tokenizer: Box::new(WordTokenizer::new()),
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn SentimentScorer>) -> Self {
        self.classifier = SentimentClassifier::with_scorer(scorer);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Analyze one raw input line.
    #[instrument(skip(self, raw_input), fields(input_len = raw_input.len()))]
    pub fn analyze(&self, raw_input: &str) -> UserTurn {
        let start = Instant::now();

        let normalized_input = normalize(raw_input);
        let classification = self.classifier.classify(raw_input);
        let tokens = self.tokenizer.tokenize(&normalized_input);

        let (matched_entry, response) = match self.knowledge.find(&tokens) {
            Some((index, entry)) => (Some(index), entry.response().to_string()),
            None => (None, FALLBACK_RESPONSE.to_string()),
        };

        let turn = UserTurn {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            raw_input: raw_input.to_string(),
            normalized_input,
            tokens,
            sentiment: classification.score,
            label: classification.label,
            response,
            matched_entry,
        };

        debug!(
            turn_id = %turn.id,
            score = turn.sentiment.score,
            label = %turn.label,
            matched = ?turn.matched_entry,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Turn analyzed"
        );
        turn
    }
}
