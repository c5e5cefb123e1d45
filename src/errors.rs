//! Error types for recall.

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::store::StoreError;

/// Main error type for recall operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error outside the record store (key file, directories).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding provider failure.
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Record store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Empty or whitespace-only input.
    #[error("Input cannot be empty")]
    EmptyInput,

    /// Input exceeds the maximum accepted length.
    #[error("Input too long: {actual_length} bytes (max {max_length})")]
    InputTooLong {
        max_length: usize,
        actual_length: usize,
    },

    /// Result count outside the accepted range.
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}
