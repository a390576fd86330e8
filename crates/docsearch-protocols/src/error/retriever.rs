//! Errors raised by dense and sparse retriever collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrieverError {
    #[error("Retrieval failed: {0}")]
    Failed(String),

    #[error("Retriever unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
