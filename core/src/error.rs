//! Common error types for ytree values and paths.

use thiserror::Error;

/// Errors raised while converting or parsing scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Text or value cannot be read as the requested kind.
    #[error("invalid {expected} value: {value}")]
    Invalid { value: String, expected: String },

    /// Value parsed but does not fit the requested width or scale.
    #[error("value {value} out of range for {expected}")]
    OutOfRange { value: String, expected: String },
}

impl ValueError {
    pub fn invalid(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Invalid {
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn out_of_range(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::OutOfRange {
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Errors raised while parsing or joining paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The textual path is not well formed.
    #[error("malformed path {path:?}: {reason}")]
    Syntax { path: String, reason: String },

    /// An element or key name is empty.
    #[error("empty name in path {0}")]
    EmptyName(String),

    /// Prefix and path disagree on their origin.
    #[error("origin mismatch: prefix has {prefix:?}, path has {path:?}")]
    OriginMismatch { prefix: String, path: String },
}

impl PathError {
    pub fn syntax(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for value conversions.
pub type ValueResult<T> = Result<T, ValueError>;

/// Result type for path operations.
pub type PathResult<T> = Result<T, PathError>;
