//! Memory record data types.

use std::fmt;

use chrono::{DateTime, Utc};

/// A stored memory: the command to recall and the description it is found by.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    /// Insertion-ordered identifier, assigned by the store.
    pub id: i64,
    /// Payload returned verbatim on recall. Never embedded.
    pub command_text: String,
    /// Natural-language description the embedding was generated from.
    pub description_text: String,
    /// Embedding of `description_text`.
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// A memory together with its cosine similarity to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMemory {
    pub record: MemoryRecord,
    /// Cosine similarity in [-1, 1].
    pub score: f64,
}

impl fmt::Display for ScoredMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n  {} [score: {:.3}]",
            self.record.command_text, self.record.description_text, self.score
        )
    }
}
