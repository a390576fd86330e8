//! # docsearch protocols
//!
//! Data model and collaborator contracts for the hybrid retrieval core.
//! Contains only types and trait definitions - no search or cache logic.
//!
//! ## Core Traits
//!
//! - [`Retriever`] - Dense or sparse retriever consumed by the hybrid searcher
//! - [`CacheBackend`] - One tier of the embedding cache
//! - [`KeyValueClient`] - Client for the external key-value store behind the remote tier
//! - [`EmbeddingProvider`] - Embedding generator used by callers on a cache miss

pub mod cache;
pub mod embedding;
pub mod error;
pub mod retriever;
pub mod types;

pub use cache::{BackendStats, CacheBackend, KeyValueClient, ScanPage};
pub use embedding::EmbeddingProvider;
pub use error::{CacheError, EmbeddingError, RetrieverError, SearchError};
pub use retriever::{Retriever, RetrieverKind};
pub use types::*;
