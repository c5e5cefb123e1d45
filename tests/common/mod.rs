//! Shared helpers for integration tests.

use std::path::PathBuf;
use std::time::Duration;

use recall::{Embedder, EmbeddingError, MemoryService, RecordStore, RetryPolicy};
use tempfile::TempDir;

/// Words the keyword embedder knows, one dimension each after the bias.
const VOCABULARY: &[&str] = &["diff", "commit", "file", "list", "hidden", "show"];

/// Deterministic bag-of-words embedder.
///
/// Dimension 0 is a constant bias so every text has a non-zero vector;
/// the remaining dimensions count vocabulary words, with a trailing `s`
/// stripped so plurals match.
pub struct KeywordEmbedder;

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; VOCABULARY.len() + 1];
        vector[0] = 1.0;
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let stem = word.strip_suffix('s').unwrap_or(&word);
            if let Some(pos) = VOCABULARY.iter().position(|v| *v == stem) {
                vector[pos + 1] += 1.0;
            }
        }
        Ok(vector)
    }

    fn model(&self) -> &str {
        "keyword"
    }
}

/// Embedder that always fails as if the provider were down.
pub struct DownEmbedder;

impl Embedder for DownEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Unavailable("connection refused".to_string()))
    }

    fn model(&self) -> &str {
        "down"
    }
}

/// Retry policy that never sleeps.
pub fn no_wait(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::from_millis(10),
        multiplier: 2.0,
    }
}

/// A scratch directory and the store path inside it.
pub fn scratch() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("memories.db");
    (dir, path)
}

pub fn service_at<E: Embedder>(path: &std::path::Path, embedder: E) -> MemoryService<E> {
    let store = RecordStore::open(path).unwrap();
    MemoryService::new(store, embedder, no_wait(0))
}
