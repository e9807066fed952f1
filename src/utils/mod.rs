//! Utility functions and helpers.

pub mod http;

use regex::{Regex, RegexBuilder};

use crate::error::Result;

/// Case-insensitive substring test.
///
/// Both sides are lowercased with full Unicode rules, so "SMÅBARN" matches
/// "småbarn".
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Pattern source matching `phrase` literally, with any run of whitespace
/// (including non-breaking spaces) between its words.
pub fn phrase_pattern(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Compile a case-insensitive matcher for a single phrase.
pub fn phrase_regex(phrase: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(&phrase_pattern(phrase))
        .case_insensitive(true)
        .build()?)
}

/// Compile a case-insensitive matcher for any of the given phrases.
pub fn any_phrase_regex<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Result<Regex> {
    let alternation = phrases
        .into_iter()
        .map(|p| format!("(?:{})", phrase_pattern(p)))
        .collect::<Vec<_>>()
        .join("|");
    Ok(RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Plass for SMÅBARN", "småbarn"));
        assert!(contains_ci("Barn Under 3 år", "under 3"));
        assert!(!contains_ci("3-6 år", "0-3"));
    }

    #[test]
    fn test_phrase_regex_literal_and_case_insensitive() {
        let re = phrase_regex("Bydel St. Hanshaugen").unwrap();
        assert!(re.is_match("Ledige plasser i BYDEL ST. HANSHAUGEN"));
        assert!(re.is_match("Bydel\u{a0}St.  Hanshaugen"));
        // The dot is literal.
        assert!(!re.is_match("Bydel StX Hanshaugen"));
    }

    #[test]
    fn test_any_phrase_regex() {
        let re = any_phrase_regex(["Bydel Alna", "Bydel Østensjø"]).unwrap();
        assert!(re.is_match("bydel østensjø"));
        assert!(re.is_match("Bydel Alna"));
        assert!(!re.is_match("Alna"));
    }
}
