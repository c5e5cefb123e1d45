//! Insert operations for the memory service.

use tracing::info;

use crate::embedding::Embedder;
use crate::errors::Error;

use super::MemoryService;

impl<E: Embedder> MemoryService<E> {
    /// Store a command under its natural-language description.
    ///
    /// Only the description is embedded. The command is stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Either text is empty or exceeds 100,000 bytes
    /// - Embedding generation fails (nothing is written)
    /// - The embedding does not match the store's dimensionality
    /// - The store cannot be written
    pub fn insert(&mut self, command_text: &str, description_text: &str) -> Result<i64, Error> {
        Self::validate_input_length(command_text)?;
        Self::validate_input_length(description_text)?;

        let embedding = self.embed(description_text)?;
        let id = self
            .store
            .append(command_text, description_text, &embedding)?;

        info!(id, model = self.embedder.model(), "memory inserted");
        Ok(id)
    }
}
