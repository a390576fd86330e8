//! Hybrid search errors.

use thiserror::Error;

use super::retriever::RetrieverError;
use crate::retriever::RetrieverKind;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{kind} retriever failed: {source}")]
    Retriever {
        kind: RetrieverKind,
        #[source]
        source: RetrieverError,
    },
}

impl SearchError {
    /// Wrap a collaborator error with the side that produced it.
    pub fn retriever(kind: RetrieverKind, source: RetrieverError) -> Self {
        Self::Retriever { kind, source }
    }

    /// True for errors caused by caller input rather than a collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidQuery(_) | Self::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_query_error() {
        let err = SearchError::InvalidQuery("query must not be empty".to_string());
        assert!(err.to_string().contains("Invalid query"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_config_error() {
        let err = SearchError::InvalidConfig("unknown fusion method 'max'".to_string());
        assert!(err.to_string().contains("'max'"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_retriever_error_names_side() {
        let err = SearchError::retriever(
            RetrieverKind::Sparse,
            RetrieverError::Failed("timeout".to_string()),
        );
        let display = err.to_string();
        assert!(display.starts_with("sparse retriever failed"));
        assert!(display.contains("timeout"));
        assert!(!err.is_validation());
        assert!(err.source().is_some());
    }
}
