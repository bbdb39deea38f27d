//! Data tree error types.

use thiserror::Error;

/// Result type for data tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors raised while editing bound data directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Unknown field: {field} on record {record}")]
    UnknownField { record: String, field: String },

    #[error("Duplicate list key: {0}")]
    DuplicateKey(String),
}

impl TreeError {
    pub fn unknown_field(record: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            record: record.into(),
            field: field.into(),
        }
    }
}

/// Result type for payload decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while decoding a structured payload into bound data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unknown member {member} at /{path}")]
    UnknownField { path: String, member: String },

    #[error("Type mismatch at /{path}: {message}")]
    Type { path: String, message: String },

    #[error("Schema mismatch at /{path}: {message}")]
    Schema { path: String, message: String },

    #[error("Missing key {key} in entry of /{path}")]
    MissingKey { path: String, key: String },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl DecodeError {
    pub fn type_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Type {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }
}
