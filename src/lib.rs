//! docsearch - hybrid retrieval core.
//!
//! Two pieces sit on the query path of a document search system:
//!
//! - [`EmbeddingCache`]: a two-tier cache of embedding vectors keyed by
//!   normalized text, so callers skip re-embedding text they have seen
//! - [`HybridSearcher`]: runs a dense and a sparse retriever for a query and
//!   fuses their ranked lists
//!
//! [`RetrievalCore`] builds both from a [`Config`].

mod retrieval;
mod error;
pub mod telemetry;

pub use crate::retrieval::RetrievalCore;
pub use crate::error::Error;

pub use docsearch_cache::{
    CacheEntry, CacheStats, EmbeddingCache, LocalKeyValueStore, MemoryCacheBackend,
    RemoteCacheBackend, cache_key,
};
pub use docsearch_config::{
    CacheConfig, Config, ConfigError, ConfigLoader, ConfigValidator, FusionConfig, FusionMethod,
    HybridSearchConfig, LoggingConfig, MemoryCacheConfig, RemoteCacheConfig, SearchConfig,
};
pub use docsearch_hybrid::{
    HybridSearcher, RetrieverStatus, deduplicate_results, fuse, normalize_scores,
    reciprocal_rank_fusion, weighted_score_fusion,
};
pub use docsearch_protocols::{
    BackendStats, CacheBackend, CacheError, ChunkKey, DocumentChunk, Embedding, EmbeddingError,
    EmbeddingProvider, KeyValueClient, Metadata, Retriever, RetrieverError, RetrieverKind,
    ScanPage, SearchError, SearchResult,
};
