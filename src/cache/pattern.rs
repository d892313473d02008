//! Key Pattern Module
//!
//! Glob-style key patterns where `*` matches zero or more characters.

use regex::Regex;

use crate::error::{CacheError, Result};

/// Wildcard character. No other glob syntax is recognised.
pub const WILDCARD: char = '*';

// == Key Pattern ==
/// A compiled invalidation pattern, anchored at both ends of the key.
///
/// Every character other than `*` matches itself literally, so
/// `patient(1).record` only ever matches that exact key.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Regex,
}

impl KeyPattern {
    /// Compiles `pattern` into an anchored matcher.
    pub fn compile(pattern: &str) -> Result<Self> {
        let body = pattern
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        // (?s) lets `*` span newlines inside keys
        let regex = Regex::new(&format!("(?s)^{}$", body))
            .map_err(|e| CacheError::InvalidPattern(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns true if `key` matches the whole pattern.
    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    /// The pattern as given by the caller.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when the pattern contains no wildcard.
    pub fn is_literal(&self) -> bool {
        !self.source.contains(WILDCARD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, key: &str) -> bool {
        KeyPattern::compile(pattern).unwrap().is_match(key)
    }

    #[test]
    fn test_prefix_pattern() {
        assert!(matches("patients:*", "patients:1"));
        assert!(matches("patients:*", "patients:"));
        assert!(!matches("patients:*", "doctors:1"));
        assert!(!matches("patients:*", "xpatients:1"));
    }

    #[test]
    fn test_suffix_and_contains_patterns() {
        assert!(matches("*:list", "appointments:list"));
        assert!(!matches("*:list", "appointments:list:today"));
        assert!(matches("*ward*", "beds:ward:3"));
        assert!(matches("*", ""));
        assert!(matches("*", "anything at all"));
    }

    #[test]
    fn test_literal_characters() {
        assert!(matches("patient(1).record", "patient(1).record"));
        assert!(!matches("patient(1).record", "patient(1)xrecord"));
        assert!(!matches("patient(1).record", "patient(1).record.bak"));
        assert!(!matches("labs.?", "labs.x"));
        assert!(matches("labs.?", "labs.?"));
        assert!(matches("[rx]+*", "[rx]+42"));
        assert!(!matches("[rx]+*", "rx42"));
    }

    #[test]
    fn test_newline_in_key() {
        assert!(matches("notes:*", "notes:line1\nline2"));
    }

    #[test]
    fn test_is_literal() {
        assert!(KeyPattern::compile("patients:1").unwrap().is_literal());
        assert!(!KeyPattern::compile("patients:*").unwrap().is_literal());
        assert_eq!(KeyPattern::compile("a*b").unwrap().as_str(), "a*b");
    }
}
