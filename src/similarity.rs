//! Exact cosine ranking over the full candidate set.

use std::cmp::Ordering;

use crate::memory_types::MemoryRecord;

/// A candidate borrowed from the candidate set with its similarity to the query.
#[derive(Debug, Clone, Copy)]
pub struct Ranked<'a> {
    pub record: &'a MemoryRecord,
    pub score: f64,
}

/// Compute cosine similarity between two vectors.
///
/// Returns `None` when the score is undefined: either vector is empty, lengths
/// differ, a value is NaN or infinite, or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    if a.iter().chain(b.iter()).any(|x| !x.is_finite()) {
        return None;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    // Rounding can push parallel vectors a hair past 1.0.
    Some((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Rank `candidates` by cosine similarity to `query`, best first.
///
/// Equal scores keep the lower id first. Candidates whose score is undefined
/// (see [`cosine_similarity`]) are left out. Returns at most `k` entries.
pub fn rank<'a>(query: &[f32], candidates: &'a [MemoryRecord], k: usize) -> Vec<Ranked<'a>> {
    if k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<Ranked<'a>> = candidates
        .iter()
        .filter_map(|record| {
            cosine_similarity(query, &record.embedding).map(|score| Ranked { record, score })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });
    ranked.truncate(k);
    ranked
}
