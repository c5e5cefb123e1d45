//! Core memory service struct combining embedding generation and persistence.

use crate::embedding::Embedder;
use crate::errors::Error;
use crate::store::RecordStore;

use super::RetryPolicy;

/// Maximum allowed input length in bytes.
pub const MAX_INPUT_LENGTH: usize = 100_000;
/// Maximum allowed limit for query operations.
pub const MAX_SEARCH_LIMIT: usize = 10_000;
/// Result count used by `list` when none is given.
pub const DEFAULT_QUERY_LIMIT: usize = 10;

/// Semantic memory over a record store.
///
/// Descriptions are embedded on insert; queries are embedded and ranked
/// against every stored record. The service holds no state beyond its
/// collaborators, so each call sees the store as it is on disk.
pub struct MemoryService<E: Embedder> {
    pub(crate) store: RecordStore,
    pub(crate) embedder: E,
    pub(crate) retry: RetryPolicy,
}

impl<E: Embedder> MemoryService<E> {
    /// Combine an open store, an embedding provider and a retry policy.
    pub fn new(store: RecordStore, embedder: E, retry: RetryPolicy) -> Self {
        MemoryService {
            store,
            embedder,
            retry,
        }
    }

    /// The underlying record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Embed `text`, retrying transient provider failures.
    pub(crate) fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        Ok(self.retry.run(|| self.embedder.embed(text))?)
    }

    /// Validate input length (rejects empty and whitespace-only inputs).
    pub(crate) fn validate_input_length(text: &str) -> Result<(), Error> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        if text.len() > MAX_INPUT_LENGTH {
            return Err(Error::InputTooLong {
                max_length: MAX_INPUT_LENGTH,
                actual_length: text.len(),
            });
        }
        Ok(())
    }
}

/// Validate a result count.
pub(crate) fn validate_limit(limit: usize) -> Result<(), Error> {
    if limit == 0 {
        return Err(Error::InvalidLimit("limit must be at least 1".to_string()));
    }
    if limit > MAX_SEARCH_LIMIT {
        return Err(Error::InvalidLimit(format!(
            "limit {limit} exceeds maximum {MAX_SEARCH_LIMIT}"
        )));
    }
    Ok(())
}
