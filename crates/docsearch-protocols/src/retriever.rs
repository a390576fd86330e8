//! Retriever protocol definitions.
//!
//! Dense (embedding similarity) and sparse (lexical) retrievers share one
//! contract. The hybrid searcher only consumes their ranked output; the
//! index data structures live behind this trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrieverError;
use crate::types::{DocumentChunk, SearchResult};

/// Core trait for dense and sparse retrievers.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `top_k` results, best first, with 1-based ranks assigned.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, RetrieverError>;

    /// Index a batch of chunks.
    async fn add_documents(&self, chunks: &[Arc<DocumentChunk>]) -> Result<(), RetrieverError>;

    /// Number of chunks currently indexed.
    fn document_count(&self) -> usize;

    /// Drop every indexed chunk.
    async fn clear(&self) -> Result<(), RetrieverError>;
}

/// Which side of the hybrid search a retriever serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverKind {
    Dense,
    Sparse,
}

impl RetrieverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Sparse => "sparse",
        }
    }
}

impl fmt::Display for RetrieverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
