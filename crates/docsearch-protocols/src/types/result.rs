//! Search results.

use std::sync::Arc;

use serde::Serialize;

use super::chunk::{ChunkKey, DocumentChunk};

/// A single ranked hit.
///
/// `rank` is 1-based and assigned after sorting. `distance` is kept equal to
/// `1.0 - score`; use [`SearchResult::set_score`] to change both together.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub chunk: Arc<DocumentChunk>,
    pub score: f32,
    pub rank: usize,
    pub distance: f32,
    pub explanation: String,
}

impl SearchResult {
    pub fn new(chunk: Arc<DocumentChunk>, score: f32) -> Self {
        Self {
            chunk,
            score,
            rank: 0,
            distance: 1.0 - score,
            explanation: String::new(),
        }
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Replace the score and recompute the distance.
    pub fn set_score(&mut self, score: f32) {
        self.score = score;
        self.distance = 1.0 - score;
    }

    /// Deduplication key of the referenced chunk.
    pub fn key(&self) -> ChunkKey {
        self.chunk.key()
    }
}

/// Assign ranks 1..N in list order.
pub fn assign_ranks(results: &mut [SearchResult]) {
    for (position, result) in results.iter_mut().enumerate() {
        result.rank = position + 1;
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
