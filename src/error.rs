//! Top-level error type.

use thiserror::Error;

use docsearch_config::ConfigError;
use docsearch_protocols::{CacheError, EmbeddingError, SearchError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Configuration rejected: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),
}
