//! Error types for the subtoken libraries.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer libraries.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Malformed or inconsistent model data. Fatal to construction.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Decode was given an ID outside the vocabulary
    #[error("Invalid token ID: {0}")]
    InvalidTokenId(u32),

    /// A unit of input has no vocabulary entry and the model rejects unknowns
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error saving model data
    #[error("Save error: {0}")]
    Save(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
