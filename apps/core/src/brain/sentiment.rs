//! Sentiment scoring and classification.
//!
//! Scoring sits behind the [`SentimentScorer`] trait so the word list can be
//! swapped out. The bundled [`LexiconScorer`] follows the AFINN approach: every
//! known word carries an integer weight in `-5..=5`, the weights of all words
//! in the text are summed, and a weight directly preceded by a negator is
//! inverted.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use super::normalizer::normalize;

/// AFINN-style weighted word list (English)
const LEXICON_EN: &[(&str, i32)] = &[
    // Strongly positive
    ("breathtaking", 5),
    ("outstanding", 5),
    ("superb", 5),
    ("thrilled", 5),
    ("amazing", 4),
    ("awesome", 4),
    ("brilliant", 4),
    ("fantastic", 4),
    ("fun", 4),
    ("win", 4),
    ("wonderful", 4),
    ("ecstatic", 4),
    // Positive
    ("beautiful", 3),
    ("best", 3),
    ("excellent", 3),
    ("excited", 3),
    ("glad", 3),
    ("good", 3),
    ("great", 3),
    ("happy", 3),
    ("love", 3),
    ("loved", 3),
    ("loves", 3),
    ("lovely", 3),
    ("nice", 3),
    ("perfect", 3),
    ("delighted", 3),
    ("better", 2),
    ("enjoy", 2),
    ("enjoyed", 2),
    ("helpful", 2),
    ("help", 2),
    ("like", 2),
    ("liked", 2),
    ("likes", 2),
    ("thank", 2),
    ("thanks", 2),
    ("interesting", 2),
    ("welcome", 2),
    ("cool", 1),
    ("ok", 1),
    ("okay", 1),
    ("yes", 1),
    ("sure", 1),
    // Negative
    ("sorry", -1),
    ("broken", -1),
    ("cry", -1),
    ("no", -1),
    ("confused", -2),
    ("afraid", -2),
    ("annoyed", -2),
    ("annoying", -2),
    ("disappointed", -2),
    ("disappointing", -2),
    ("fail", -2),
    ("failed", -2),
    ("fear", -2),
    ("hurt", -2),
    ("pain", -2),
    ("poor", -2),
    ("problem", -2),
    ("problems", -2),
    ("sad", -2),
    ("stupid", -2),
    ("upset", -2),
    ("useless", -2),
    ("wrong", -2),
    ("lonely", -2),
    ("angry", -3),
    ("awful", -3),
    ("bad", -3),
    ("boring", -3),
    ("hate", -3),
    ("hated", -3),
    ("hates", -3),
    ("horrible", -3),
    ("lost", -3),
    ("sucks", -3),
    ("terrible", -3),
    ("ugly", -3),
    ("worried", -3),
    ("worry", -3),
    ("worse", -3),
    ("worst", -3),
    ("miserable", -3),
    ("furious", -3),
    ("disgusting", -3),
    ("damn", -4),
    ("hopeless", -4),
    ("catastrophic", -4),
];

/// Words that invert the weight of the word that follows them
const NEGATORS_EN: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nobody", "nothing", "nowhere", "cant",
    "can't", "dont", "don't", "doesnt", "doesn't", "wont", "won't", "isnt", "isn't", "aint",
    "ain't", "wasnt", "wasn't", "werent", "weren't", "didnt", "didn't", "shouldnt", "shouldn't",
    "couldnt", "couldn't", "wouldnt", "wouldn't", "hasnt", "hasn't", "havent", "haven't",
];

// Apostrophes and hyphens are kept so negated contractions survive as one token.
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.,/#!?$%^&*;:{}=_`"~()\[\]]"#).expect("Invalid regex: sentiment punctuation")
});

/// Raw sentiment score of a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Sum of word weights; its sign decides the label
    pub score: i32,
    /// `score` divided by the number of words (0.0 for empty text)
    pub comparative: f32,
    /// Words that contributed a positive weight
    pub positive: Vec<String>,
    /// Words that contributed a negative weight
    pub negative: Vec<String>,
}

impl SentimentScore {
    /// Score of a text with no sentiment-bearing words.
    pub fn neutral() -> Self {
        Self {
            score: 0,
            comparative: 0.0,
            positive: Vec::new(),
            negative: Vec::new(),
        }
    }
}

/// Classification bucket derived from the sign of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// `> 0` is positive, `< 0` is negative, `0` is neutral.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 0 => SentimentLabel::Positive,
            s if s < 0 => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }

    /// Line shown to the user before the matched response
    pub fn reaction(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "I'm glad to hear that!",
            SentimentLabel::Neutral => "I see.",
            SentimentLabel::Negative => "I'm sorry to hear that.",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Produces a raw sentiment score for already-normalized text.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> SentimentScore;
}

/// Word-list scorer with single-word negation
pub struct LexiconScorer {
    weights: HashMap<String, i32>,
    negators: HashSet<String>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    /// Create a scorer with the bundled English word list
    pub fn new() -> Self {
        Self::with_lexicon(LEXICON_EN.iter().map(|(w, s)| (w.to_string(), *s)))
    }

    /// Create a scorer from a custom word list; the bundled negators still apply.
    pub fn with_lexicon<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, i32)>,
    {
        Self {
            weights: entries.into_iter().collect(),
            negators: NEGATORS_EN.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn words(text: &str) -> Vec<String> {
        PUNCTUATION
            .replace_all(&text.to_lowercase(), " ")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> SentimentScore {
        let words = Self::words(text);
        if words.is_empty() {
            return SentimentScore::neutral();
        }

        let mut result = SentimentScore::neutral();
        for (i, word) in words.iter().enumerate() {
            let Some(&weight) = self.weights.get(word) else {
                continue;
            };
            let negated = i > 0 && self.negators.contains(&words[i - 1]);
            let weight = if negated { -weight } else { weight };

            result.score += weight;
            if weight > 0 {
                result.positive.push(word.clone());
            } else if weight < 0 {
                result.negative.push(word.clone());
            }
        }
        result.comparative = result.score as f32 / words.len() as f32;
        result
    }
}

/// Outcome of classifying one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub score: SentimentScore,
    pub label: SentimentLabel,
}

/// Normalizes input, delegates scoring and applies the labeling rule.
pub struct SentimentClassifier {
    scorer: Box<dyn SentimentScorer>,
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentClassifier {
    pub fn new() -> Self {
        Self::with_scorer(Box::new(LexiconScorer::new()))
    }

    pub fn with_scorer(scorer: Box<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    pub fn classify(&self, input: &str) -> Classification {
        let score = self.scorer.score(&normalize(input));
        let label = SentimentLabel::from_score(score.score);
        Classification { score, label }
    }
}
