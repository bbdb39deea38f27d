//! Engine error types.
//!
//! Every error carries the canonical path traversed when it was raised.
//! A failed call may already have changed the tree: materialized
//! intermediates and values installed before the failure are not rolled
//! back.

use thiserror::Error;
use ytree_core::PathError;
use ytree_tree::DecodeError;
use ytree_validate::ValidationError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during path resolution and mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Schema mismatch at {path}: {message}")]
    SchemaMismatch { path: String, message: String },

    #[error("Path not found at {path}: {message}")]
    PathNotFound { path: String, message: String },

    #[error("Type mismatch at {path}: {message}")]
    TypeMismatch { path: String, message: String },

    #[error("Validation failed at {path}: {source}")]
    ValidationFailed {
        path: String,
        #[source]
        source: ValidationError,
    },

    #[error("Cannot set {path}: {message}")]
    UnsettableTarget { path: String, message: String },

    #[error("Malformed path {path}: {message}")]
    MalformedPath { path: String, message: String },
}

impl EngineError {
    pub fn schema_mismatch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PathNotFound {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn type_mismatch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn validation(path: impl Into<String>, source: ValidationError) -> Self {
        Self::ValidationFailed {
            path: path.into(),
            source,
        }
    }

    pub fn unsettable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsettableTarget {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Map a payload decoding failure at `path`.
    pub fn from_decode(path: impl Into<String>, err: DecodeError) -> Self {
        let path = path.into();
        let message = err.to_string();
        match err {
            DecodeError::UnknownField { .. } => Self::PathNotFound { path, message },
            DecodeError::Type { .. } => Self::TypeMismatch { path, message },
            DecodeError::Schema { .. } | DecodeError::MissingKey { .. } | DecodeError::Tree(_) => {
                Self::SchemaMismatch { path, message }
            }
        }
    }

    /// The canonical path traversed when the error was raised.
    pub fn path(&self) -> &str {
        match self {
            Self::SchemaMismatch { path, .. }
            | Self::PathNotFound { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::ValidationFailed { path, .. }
            | Self::UnsettableTarget { path, .. }
            | Self::MalformedPath { path, .. } => path,
        }
    }

    /// Short name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchemaMismatch { .. } => "SchemaMismatch",
            Self::PathNotFound { .. } => "PathNotFound",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::ValidationFailed { .. } => "ValidationFailed",
            Self::UnsettableTarget { .. } => "UnsettableTarget",
            Self::MalformedPath { .. } => "MalformedPath",
        }
    }
}

impl From<PathError> for EngineError {
    fn from(err: PathError) -> Self {
        let path = match &err {
            PathError::Syntax { path, .. } => path.clone(),
            PathError::EmptyName(path) => path.clone(),
            PathError::OriginMismatch { path, .. } => path.clone(),
        };
        Self::MalformedPath {
            path,
            message: err.to_string(),
        }
    }
}
