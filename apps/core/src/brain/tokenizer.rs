//! Word tokenization.
//!
//! Splits normalized text into word tokens. Anything that is not a letter,
//! a digit or an underscore acts as a separator, so `"don't"` yields
//! `["don", "t"]`.

use regex::Regex;
use std::sync::LazyLock;

// NOTE: expect() is acceptable here, the pattern is a compile-time constant.
static WORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_]+").expect("Invalid regex: word separator"));

/// Splits text into word tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Tokenizer that splits on runs of non-word characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        WORD_SEPARATOR
            .split(text)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}
