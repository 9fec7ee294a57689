//! Input normalization shared by sentiment scoring and tokenization.

/// Lowercases and trims raw user input.
///
/// Total over any string; an empty or whitespace-only input yields `""`.
pub fn normalize(input: &str) -> String {
    input.to_lowercase().trim().to_string()
}
