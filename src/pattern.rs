//! File name patterns for include/exclude filtering

use crate::error::ConfigError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// A compiled regular expression matched against file names
///
/// Patterns are tested against the final path component only, so
/// `^target$` matches `build/target` but `build/` never matches anything.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    expr: Regex,
}

impl Pattern {
    /// Compile a pattern from its text
    pub fn new(text: &str) -> Result<Self, ConfigError> {
        let expr = Regex::new(text).map_err(|e| ConfigError::InvalidPattern {
            pattern: text.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            text: text.to_string(),
            expr,
        })
    }

    /// Check whether a file name satisfies the pattern
    pub fn is_match(&self, name: &str) -> bool {
        self.expr.is_match(name)
    }

    /// Source text the pattern was compiled from
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Pattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Pattern {}

/// Returns true if any pattern in the set matches
pub fn any_match(patterns: &[Pattern], name: &str) -> bool {
    patterns.iter().any(|p| p.is_match(name))
}
