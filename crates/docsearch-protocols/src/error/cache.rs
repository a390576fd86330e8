//! Embedding cache errors.
//!
//! Only [`CacheError::LengthMismatch`] is ever returned to cache callers.
//! The other variants come from key-value clients and are absorbed by the
//! remote tier, which degrades to a miss.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Batch length mismatch: {texts} texts but {embeddings} embeddings")]
    LengthMismatch { texts: usize, embeddings: usize },

    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
