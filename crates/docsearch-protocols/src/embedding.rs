//! Embedding provider protocol.
//!
//! The cache and the searcher never call a provider. Callers embed on a
//! cache miss and write the result back through the embedding cache.

use async_trait::async_trait;

use crate::error::EmbeddingError;
use crate::types::Embedding;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate one embedding per input text, in input order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;
}
