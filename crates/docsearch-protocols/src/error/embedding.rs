//! Embedding provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding failed: {0}")]
    Failed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_error_display() {
        let err = EmbeddingError::Failed("rate limited".to_string());
        assert_eq!(err.to_string(), "Embedding failed: rate limited");

        let err = EmbeddingError::InvalidInput("empty batch".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty batch");
    }
}
