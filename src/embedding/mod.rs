//! Text-to-vector embedding providers.
//!
//! Every provider implements [`Embedder`]. The memory service only sees the
//! trait, so providers can be swapped without touching storage or ranking.
//! All calls are blocking and bounded by the configured request timeout.

mod credentials;
pub mod ollama;
pub mod openai;

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::{Config, ProviderKind};

pub use credentials::{API_KEY_ENV, Credentials, store_api_key};
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;

/// Longest provider error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 300;

/// Failures reported by an embedding provider.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Missing or rejected credential. Never retried.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The provider asked the caller to slow down.
    #[error("rate limited{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Transport failure, timeout or server-side error.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider refused the request (unknown model, oversized input).
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// A successful response that does not hold a usable vector.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(delay) => format!(" (retry after {}s)", delay.as_secs()),
        None => String::new(),
    }
}

impl EmbeddingError {
    /// Whether the same request may succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbeddingError::RateLimited { .. } | EmbeddingError::Unavailable(_)
        )
    }

    /// Delay requested by the provider, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            EmbeddingError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Converts text into a fixed-length vector.
///
/// Implementations must return vectors of the same length for every call
/// made with one provider/model configuration.
pub trait Embedder {
    /// Embed a single, non-empty text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

/// Build the provider selected by `config`.
pub fn from_config(config: &Config) -> Result<Box<dyn Embedder>, EmbeddingError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let api_base = config.api_base();
    match config.provider {
        ProviderKind::OpenAi => Ok(Box::new(OpenAiEmbedder::new(
            &api_base,
            config.embedding_model(),
            Credentials::Environment {
                key_file: config.api_key_path(),
            },
            timeout,
        )?)),
        ProviderKind::Ollama => Ok(Box::new(OllamaEmbedder::new(
            &api_base,
            config.embedding_model(),
            timeout,
        )?)),
    }
}

/// Blocking HTTP client with a whole-request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, EmbeddingError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| EmbeddingError::Unavailable(format!("failed to build HTTP client: {e}")))
}

/// Send a JSON request and decode a JSON response, mapping failures onto
/// [`EmbeddingError`].
pub(crate) fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, EmbeddingError> {
    let response = request.send().map_err(transport_error)?;
    let status = response.status();
    if !status.is_success() {
        let retry_after = parse_retry_after(response.headers());
        let body = response.text().unwrap_or_default();
        return Err(classify_status(status, retry_after, &body));
    }
    response
        .json::<T>()
        .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))
}

fn transport_error(err: reqwest::Error) -> EmbeddingError {
    if err.is_timeout() {
        EmbeddingError::Unavailable(format!("request timed out: {err}"))
    } else {
        EmbeddingError::Unavailable(err.to_string())
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
pub(crate) fn classify_status(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> EmbeddingError {
    let message = summarize_body(body);
    match status.as_u16() {
        401 | 403 => EmbeddingError::Unauthorized(format!("provider returned {status}: {message}")),
        429 => EmbeddingError::RateLimited { retry_after },
        408 | 500..=599 => EmbeddingError::Unavailable(format!("provider returned {status}: {message}")),
        code => EmbeddingError::Rejected { status: code, message },
    }
}

/// `Retry-After` in its delay-seconds form. HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Pull the human-readable message out of an error body.
///
/// OpenAI answers `{"error": {"message": ...}}`, Ollama `{"error": "..."}`.
fn summarize_body(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            let error = value.get("error")?;
            error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
                .map(str::to_string)
        });

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.chars().count() > MAX_ERROR_BODY {
        let truncated: String = message.chars().take(MAX_ERROR_BODY).collect();
        format!("{truncated}...")
    } else {
        message
    }
}

/// Reject vectors no store could use.
pub(crate) fn validate_vector(vector: Vec<f32>) -> Result<Vec<f32>, EmbeddingError> {
    if vector.is_empty() {
        return Err(EmbeddingError::InvalidResponse(
            "provider returned an empty embedding".to_string(),
        ));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(EmbeddingError::InvalidResponse(
            "provider returned NaN or infinite values".to_string(),
        ));
    }
    Ok(vector)
}

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::MockServer;

    /// Runtime hosting the mock HTTP server; the blocking client under test
    /// runs outside of it on the test thread.
    pub fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    pub fn mock_server(rt: &tokio::runtime::Runtime) -> MockServer {
        rt.block_on(MockServer::start())
    }
}
