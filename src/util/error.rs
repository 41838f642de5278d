//! Error types for the shapestate library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for metadata persistence operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A key was looked up in a metadata document that does not contain it
    #[error("Key not present: {0}")]
    KeyNotFound(String),

    /// A key was registered twice in the same registry
    #[error("Key already registered: {0}")]
    AlreadyRegistered(String),

    /// A key was deregistered (or dispatched) without being registered first
    #[error("Key not registered: {0}")]
    NotRegistered(String),

    /// Type mismatch when extracting or decoding a value
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A numeric conversion would lose information
    #[error("Inaccurate conversion: {value} does not fit {target}")]
    InaccurateConversion { value: String, target: String },

    /// A value shape has no wire tag, or an unknown tag appeared while decoding
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Invalid data structure in a state file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Malformed version string
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a type mismatch error.
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type alias for shapestate operations.
pub type Result<T> = std::result::Result<T, Error>;
