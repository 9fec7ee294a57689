//! # Brain Module
//!
//! Rule-based analysis of chat input. No model, no learned state.
//!
//! ## Components
//! - `normalizer`: lowercase + trim
//! - `tokenizer`: word splitting
//! - `sentiment`: AFINN-style scoring and labeling
//! - `knowledge`: ordered keyword → response rules, first match wins
//! - `turn`: per-input output structure
//! - `analyzer`: runs all of the above for one input

pub mod analyzer;
pub mod knowledge;
pub mod normalizer;
pub mod sentiment;
pub mod tokenizer;
pub mod turn;

pub use analyzer::TurnAnalyzer;
pub use knowledge::{match_response, KnowledgeBase, KnowledgeEntry, FALLBACK_RESPONSE};
pub use normalizer::normalize;
pub use sentiment::{
    Classification, LexiconScorer, SentimentClassifier, SentimentLabel, SentimentScore,
    SentimentScorer,
};
pub use tokenizer::{Tokenizer, WordTokenizer};
pub use turn::UserTurn;
