//! Batch error types.

use std::fmt;
use thiserror::Error;
use ytree_engine::EngineError;
use ytree_validate::Violations;

/// Which phase of a batch an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Delete,
    Replace,
    Update,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::Delete => "delete",
            OpKind::Replace => "replace",
            OpKind::Update => "update",
        };
        f.write_str(name)
    }
}

/// Batch errors.
#[derive(Debug, Error)]
pub enum BatchError {
    /// One operation failed.
    #[error("{op} {path} failed: {source}")]
    Operation {
        op: OpKind,
        path: String,
        #[source]
        source: EngineError,
    },

    /// Several failures collected in best-effort mode.
    #[error("{} batch operations failed", .0.len())]
    Multiple(Vec<BatchError>),

    /// The tree broke restrictions after every operation was applied.
    #[error("tree validation failed: {0}")]
    Validation(Violations),
}

impl BatchError {
    pub fn operation(op: OpKind, path: impl Into<String>, source: EngineError) -> Self {
        Self::Operation {
            op,
            path: path.into(),
            source,
        }
    }

    /// The engine error behind a single operation failure.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Operation { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Every individual failure, flattening aggregates.
    pub fn failures(&self) -> Vec<&BatchError> {
        match self {
            Self::Multiple(all) => all.iter().flat_map(BatchError::failures).collect(),
            other => vec![other],
        }
    }
}

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
