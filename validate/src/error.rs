//! Validation error types.

use thiserror::Error;

/// Result type for validation.
pub type ValidateResult<T> = Result<T, ValidationError>;

/// A value or schema that violates a declared restriction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Length of {value:?} is {len}, outside {ranges}")]
    Length {
        value: String,
        len: u64,
        ranges: String,
    },

    #[error("{value:?} does not match pattern {pattern:?}")]
    Pattern { value: String, pattern: String },

    #[error("Invalid pattern {pattern:?}: {reason}")]
    BadPattern { pattern: String, reason: String },

    #[error("Unknown bit name: {name}")]
    UnknownBit { name: String },

    #[error("Duplicate element: {value}")]
    Duplicate { value: String },

    #[error("Value {value} is outside {ranges}")]
    Range { value: String, ranges: String },

    #[error("{value} is not one of the declared names")]
    Enum { value: String },

    #[error("Expected {expected} value, got {actual}")]
    Kind { expected: String, actual: String },

    #[error("Invalid schema for {node}: {reason}")]
    Schema { node: String, reason: String },
}

impl ValidationError {
    pub fn kind(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Kind {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn schema(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            node: node.into(),
            reason: reason.into(),
        }
    }
}

/// Render a set of ranges for messages: `[1..4, 8..max]`.
pub(crate) fn render_ranges<T: std::fmt::Display>(ranges: &[T]) -> String {
    let parts: Vec<String> = ranges.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
