//! Ollama `/api/embed` provider for locally served models.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Embedder, EmbeddingError, http_client, send_json, validate_vector};

/// Default address of a local Ollama server.
pub const DEFAULT_API_BASE: &str = "http://localhost:11434";

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embeds text through a local Ollama server. No credential required.
pub struct OllamaEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(api_base: &str, model: &str, timeout: Duration) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: format!("{}/api/embed", api_base.trim_end_matches('/')),
            model: model.to_string(),
        })
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!(model = %self.model, bytes = text.len(), "requesting Ollama embedding");

        let response: EmbedResponse = send_json(
            self.client
                .post(&self.endpoint)
                .json(&EmbedRequest {
                    model: &self.model,
                    input: text,
                }),
        )?;

        let embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            EmbeddingError::InvalidResponse("response contained no embeddings".to_string())
        })?;
        validate_vector(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
