//! OpenAI-compatible `/embeddings` provider.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Credentials, Embedder, EmbeddingError, http_client, send_json, validate_vector};

/// Default endpoint for OpenAI-hosted models.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeds text through an OpenAI-compatible HTTP API.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    credentials: Credentials,
}

impl OpenAiEmbedder {
    /// Create a provider for `model` served at `api_base` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        api_base: &str,
        model: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: format!("{}/embeddings", api_base.trim_end_matches('/')),
            model: model.to_string(),
            credentials,
        })
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let api_key = self.credentials.api_key()?;
        debug!(model = %self.model, bytes = text.len(), "requesting OpenAI embedding");

        let response: EmbeddingResponse = send_json(
            self.client
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(&EmbeddingRequest {
                    model: &self.model,
                    input: text,
                }),
        )?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| {
                EmbeddingError::InvalidResponse("response contained no embeddings".to_string())
            })?;
        validate_vector(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
