//! Regex patterns with an expected match count.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// A regular expression plus the number of candidates it must resolve to.
///
/// Patterns use prefix ("match") semantics: the expression must match starting
/// at the first character of the candidate, but it only has to match the whole
/// candidate when it anchors its own end with `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    /// The regular expression.
    pub matches: String,
    /// Number of candidates that must match.
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

impl Pattern {
    /// Create a pattern that must resolve to exactly one candidate.
    pub fn new(matches: impl Into<String>) -> Self {
        Self {
            matches: matches.into(),
            count: default_count(),
        }
    }

    /// Set the number of candidates that must match.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Compile to a prefix-anchored regex.
    pub fn compile(&self) -> Result<Regex, PatternError> {
        compile_prefix_regex(&self.matches)
    }

    /// Returns true if `candidate` matches from its first character.
    pub fn is_match(&self, candidate: &str) -> Result<bool, PatternError> {
        Ok(self.compile()?.is_match(candidate))
    }

    /// Returns true if exactly one expected candidate is required.
    pub fn is_lone(&self) -> bool {
        self.count == 1
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_lone() {
            write!(f, "{}", self.matches)
        } else {
            write!(f, "{} (x{})", self.matches, self.count)
        }
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Compile `pattern` so that it only matches at the start of a candidate.
pub fn compile_prefix_regex(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(&format!(r"\A(?:{pattern})")).map_err(|source| PatternError {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_from_start_only() {
        let pattern = Pattern::new("cpi");
        assert!(pattern.is_match("cpih").unwrap());
        assert!(!pattern.is_match("x-cpih").unwrap());
    }

    #[test]
    fn end_anchor_is_respected() {
        let pattern = Pattern::new("^cpih$");
        assert!(pattern.is_match("cpih").unwrap());
        assert!(!pattern.is_match("cpih-2").unwrap());
    }

    #[test]
    fn alternation_is_grouped_under_the_anchor() {
        // Without the group `b` would be free to match mid-string.
        let pattern = Pattern::new("a|b");
        assert!(pattern.is_match("b-side").unwrap());
        assert!(!pattern.is_match("x-b").unwrap());
    }

    #[test]
    fn invalid_regex_reports_pattern() {
        let err = Pattern::new("data(.xml").compile().unwrap_err();
        assert_eq!(err.pattern, "data(.xml");
        assert!(err.to_string().contains("data(.xml"));
    }

    #[test]
    fn display_includes_count_when_not_lone() {
        assert_eq!(Pattern::new("^a$").to_string(), "^a$");
        assert_eq!(Pattern::new("^a$").with_count(3).to_string(), "^a$ (x3)");
    }
}
