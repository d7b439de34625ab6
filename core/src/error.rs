//! Validation error values
//!
//! Validation failures are values, not control flow: the schema validator and
//! the request normalizer both return [`ValidationError`] through `Result` so
//! callers can inspect, replace, or propagate them. A [`ValidationError`]
//! carries one [`Issue`] per offending field, each with the field path and
//! the constraint that failed.

use std::fmt;

/// A single validation failure: which field, and what constraint it broke
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    /// Path to the offending field (`""` for the value as a whole,
    /// `"tags[2].key"` for nested fields)
    pub path: String,
    /// Human-readable description of the violated constraint
    pub message: String,
}

impl Issue {
    /// Create an issue for the field at `path`
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} at \"{}\"", self.message, self.path)
        }
    }
}

/// Structured description of why a payload failed validation
///
/// Collects every issue found in one pass, so a caller sees all offending
/// fields at once rather than the first one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// All issues found, in field-declaration order
    pub issues: Vec<Issue>,
}

impl ValidationError {
    /// Create an error from a non-empty list of issues
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Create an error with a single issue
    #[must_use]
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![Issue::new(path, message)],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error: ")?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
