//! Query operations for the memory service.

use tracing::debug;

use crate::embedding::Embedder;
use crate::errors::Error;
use crate::memory_types::ScoredMemory;
use crate::similarity;
use crate::store::StoreError;

use super::MemoryService;
use super::service::validate_limit;

impl<E: Embedder> MemoryService<E> {
    #[must_use = "handle the error or results may be lost"]
    /// The k stored memories most similar to `query`.
    ///
    /// # Arguments
    ///
    /// * `query` - Query text (1 to 100,000 bytes)
    /// * `k` - Maximum number of results (1 to 10,000)
    ///
    /// # Returns
    ///
    /// Memories ordered by descending cosine similarity, ties broken by
    /// ascending id. At most `k` entries; fewer if the store holds fewer.
    /// An empty store yields an empty list without contacting the provider.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Query is empty or too long, or `k` is out of range
    /// - The store cannot be read or is corrupt
    /// - Embedding generation fails
    /// - The query embedding does not match the store's dimensionality
    pub fn query(&self, query: &str, k: usize) -> Result<Vec<ScoredMemory>, Error> {
        validate_limit(k)?;
        Self::validate_input_length(query)?;

        let candidates = self.store.all()?;
        let Some(dims) = candidates.first().map(|r| r.embedding.len()) else {
            debug!("store is empty, skipping query embedding");
            return Ok(Vec::new());
        };

        let embedding = self.embed(query)?;
        if embedding.len() != dims {
            return Err(StoreError::DimensionMismatch {
                expected: dims,
                actual: embedding.len(),
            }
            .into());
        }

        let ranked = similarity::rank(&embedding, &candidates, k);
        debug!(
            candidates = candidates.len(),
            returned = ranked.len(),
            "ranked memories"
        );

        Ok(ranked
            .into_iter()
            .map(|r| ScoredMemory {
                record: r.record.clone(),
                score: r.score,
            })
            .collect())
    }

    #[must_use = "handle the error or results may be lost"]
    /// The single best match for `query`, if the store holds any memory.
    ///
    /// # Errors
    ///
    /// Same as [`MemoryService::query`].
    pub fn get_best(&self, query: &str) -> Result<Option<ScoredMemory>, Error> {
        Ok(self.query(query, 1)?.into_iter().next())
    }
}
