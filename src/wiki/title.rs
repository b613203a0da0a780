//! Page title validation
//!
//! Titles double as URL segments and file name stems, so only ASCII
//! letters and digits are accepted.

use regex::Regex;
use std::fmt;

/// Allow-list pattern for page titles
pub const TITLE_PATTERN: &str = "^[a-zA-Z0-9]+$";

/// A title that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compiled title validator, built once at startup
#[derive(Debug, Clone)]
pub struct TitleValidator {
    pattern: Regex,
}

impl TitleValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(TITLE_PATTERN)?,
        })
    }

    /// Check a candidate title against the allow-list
    pub fn is_valid(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }

    /// Validate and wrap a candidate title
    pub fn parse(&self, candidate: &str) -> Option<Title> {
        self.is_valid(candidate).then(|| Title(candidate.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> TitleValidator {
        TitleValidator::new().unwrap()
    }

    #[test]
    fn test_accepts_alphanumeric() {
        let v = validator();
        for title in ["Foo", "FrontPage", "a", "Z", "0", "page42", "ABCxyz0123456789"] {
            assert!(v.is_valid(title), "expected '{title}' to be accepted");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert!(!validator().is_valid(""));
        assert!(validator().parse("").is_none());
    }

    #[test]
    fn test_rejects_outside_character_class() {
        let v = validator();
        for title in [
            "bad title!",
            "with space",
            "dash-ed",
            "under_score",
            "dot.txt",
            "../etc/passwd",
            "a/b",
            "trailing\n",
            "%20",
            "Ünïcode",
            "１２３",
        ] {
            assert!(!v.is_valid(title), "expected '{title}' to be rejected");
        }
    }

    #[test]
    fn test_parse_keeps_title() {
        let title = validator().parse("Foo").unwrap();
        assert_eq!(title.as_str(), "Foo");
        assert_eq!(title.to_string(), "Foo");
    }
}
