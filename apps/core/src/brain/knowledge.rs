//! Static knowledge base and first-match keyword lookup.
//!
//! The knowledge base is an ordered list, not a keyed map: when several
//! entries share a keyword, the earliest one in file order answers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};
use validator::Validate;

use super::normalizer::normalize;
use super::tokenizer::{Tokenizer, WordTokenizer};
use crate::error::AppError;

/// Returned verbatim when no entry matches the input
pub const FALLBACK_RESPONSE: &str =
    "I'm sorry, I don't understand. Can you please rephrase your question?";

/// Record shape of the knowledge base file.
#[derive(Debug, Clone, Deserialize, Validate)]
struct RawEntry {
    #[validate(length(min = 1, message = "entry needs at least one keyword"))]
    keywords: Vec<String>,
    #[validate(length(min = 1, message = "entry needs a response"))]
    response: String,
}

/// A rule mapping a set of trigger keywords to a canned response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeEntry {
    keywords: HashSet<String>,
    response: String,
}

impl KnowledgeEntry {
    /// Build an entry; keywords are normalized so they compare equal to tokens.
    pub fn new<I, S>(keywords: I, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| normalize(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
            response: response.into(),
        }
    }

    pub fn keywords(&self) -> &HashSet<String> {
        &self.keywords
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    /// Keywords that `tokenizer` can never emit as a single token, such as
    /// `"don't"` or `"thank you"`. Such keywords can never match.
    pub fn unmatchable_keywords(&self, tokenizer: &dyn Tokenizer) -> Vec<&str> {
        let mut unmatchable: Vec<&str> = self
            .keywords
            .iter()
            .filter(|keyword| tokenizer.tokenize(keyword) != [keyword.as_str()])
            .map(String::as_str)
            .collect();
        unmatchable.sort_unstable();
        unmatchable
    }

    /// Whether any token is one of this entry's keywords.
    pub fn matches(&self, tokens: &[String]) -> bool {
        tokens.iter().any(|token| self.keywords.contains(token))
    }
}

/// Returns the response of the first entry whose keywords intersect `tokens`,
/// or [`FALLBACK_RESPONSE`].
pub fn match_response<'a>(tokens: &[String], entries: &'a [KnowledgeEntry]) -> &'a str {
    entries
        .iter()
        .find(|entry| entry.matches(tokens))
        .map(KnowledgeEntry::response)
        .unwrap_or(FALLBACK_RESPONSE)
}

/// Ordered, immutable collection of knowledge entries.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of `{ "keywords": [..], "response": ".." }` records.
    ///
    /// Every record is validated; the first malformed one rejects the whole file.
    /// Keywords must survive tokenization as one word, otherwise the entry
    /// could never match.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let raw: Vec<RawEntry> = serde_json::from_str(json)?;
        let tokenizer = WordTokenizer::new();
        let mut entries = Vec::with_capacity(raw.len());

        for (index, record) in raw.into_iter().enumerate() {
            record.validate().map_err(|e| {
                AppError::Validation(format!("knowledge entry #{}: {}", index, e))
            })?;
            let entry = KnowledgeEntry::new(&record.keywords, record.response);
            if entry.keywords().is_empty() {
                return Err(AppError::Validation(format!(
                    "knowledge entry #{}: keywords are blank",
                    index
                )));
            }
            let unmatchable = entry.unmatchable_keywords(&tokenizer);
            if !unmatchable.is_empty() {
                return Err(AppError::Validation(format!(
                    "knowledge entry #{}: keywords {:?} are not single words and can never match",
                    index, unmatchable
                )));
            }
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// Load the knowledge base file once at startup.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        let kb = Self::from_json(&json)?;
        info!("Loaded {} knowledge entries from {:?}", kb.len(), path);
        Ok(kb)
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First matching entry together with its position in the list.
    pub fn find(&self, tokens: &[String]) -> Option<(usize, &KnowledgeEntry)> {
        let found = self
            .entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.matches(tokens));
        if let Some((index, _)) = found {
            debug!(entry = index, "Knowledge entry matched");
        }
        found
    }

    pub fn respond(&self, tokens: &[String]) -> &str {
        match_response(tokens, &self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn greeting_kb() -> Vec<KnowledgeEntry> {
        vec![
            KnowledgeEntry::new(["hello"], "Hi!"),
            KnowledgeEntry::new(["hello", "bye"], "Later!"),
        ]
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(match_response(&tokens(&["hello"]), &greeting_kb()), "Hi!");
    }

    #[test]
    fn test_later_entry_matches_when_earlier_does_not() {
        assert_eq!(match_response(&tokens(&["bye"]), &greeting_kb()), "Later!");
    }

    #[test]
    fn test_empty_tokens_fall_back() {
        assert_eq!(match_response(&[], &greeting_kb()), FALLBACK_RESPONSE);
        assert_eq!(match_response(&[], &[]), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_no_intersection_falls_back() {
        assert_eq!(
            match_response(&tokens(&["weather", "today"]), &greeting_kb()),
            FALLBACK_RESPONSE
        );
    }

    #[test]
    fn test_find_reports_index() {
        let kb = KnowledgeBase::new(greeting_kb());
        let (index, entry) = kb.find(&tokens(&["say", "bye"])).unwrap();
        assert_eq!(index, 1);
        assert_eq!(entry.response(), "Later!");
        assert!(kb.find(&tokens(&["nothing"])).is_none());
    }

    #[test]
    fn test_keywords_are_normalized() {
        let entry = KnowledgeEntry::new(["  Hello ", "BYE"], "x");
        assert!(entry.keywords().contains("hello"));
        assert!(entry.keywords().contains("bye"));
    }

    #[test]
    fn test_from_json_preserves_order() {
        let kb = KnowledgeBase::from_json(
            r#"[
                {"keywords": ["price", "cost"], "response": "It is free."},
                {"keywords": ["cost"], "response": "Never reached."}
            ]"#,
        )
        .unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.respond(&tokens(&["cost"])), "It is free.");
    }

    #[test]
    fn test_from_json_rejects_empty_keywords() {
        let err = KnowledgeBase::from_json(r#"[{"keywords": [], "response": "x"}]"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("#0")));
    }

    #[test]
    fn test_from_json_rejects_blank_keywords() {
        let err =
            KnowledgeBase::from_json(r#"[{"keywords": ["  "], "response": "x"}]"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_multi_token_keywords_are_unmatchable() {
        let entry = KnowledgeEntry::new(["don't", "thank you", "help", "café"], "x");
        assert_eq!(
            entry.unmatchable_keywords(&WordTokenizer::new()),
            vec!["don't", "thank you"]
        );
        let tokens = WordTokenizer::new().tokenize("don't");
        assert_eq!(match_response(&tokens, &[entry]), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_from_json_rejects_unmatchable_keywords() {
        let err = KnowledgeBase::from_json(
            r#"[
                {"keywords": ["hello"], "response": "Hi!"},
                {"keywords": ["thanks", "thank you"], "response": "Welcome!"}
            ]"#,
        )
        .unwrap_err();
        assert!(
            matches!(&err, AppError::Validation(msg) if msg.contains("#1") && msg.contains("thank you")),
            "got {:?}",
            err
        );

        let err =
            KnowledgeBase::from_json(r#"[{"keywords": ["don't"], "response": "x"}]"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("don't")));
    }

    #[test]
    fn test_from_json_rejects_missing_response() {
        let err = KnowledgeBase::from_json(r#"[{"keywords": ["a"]}]"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err =
            KnowledgeBase::from_json(r#"[{"keywords": ["a"], "response": ""}]"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
