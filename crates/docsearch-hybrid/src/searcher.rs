//! Hybrid searcher orchestrating dense and sparse retrievers.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use docsearch_config::{FusionConfig, FusionMethod, HybridSearchConfig};
use docsearch_protocols::{
    DocumentChunk, Retriever, RetrieverKind, SearchError, SearchResult, assign_ranks,
};

use crate::fusion::{deduplicate_results, fuse};

/// Snapshot of the searcher's wiring, for observability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrieverStatus {
    pub dense_enabled: bool,
    pub sparse_enabled: bool,
    pub fusion_method: FusionMethod,
    pub parallel_execution: bool,
    pub dense_document_count: usize,
    pub sparse_document_count: usize,
}

/// Searcher combining a dense and a sparse retriever.
pub struct HybridSearcher {
    config: HybridSearchConfig,
    fusion: FusionConfig,
    method: FusionMethod,
    /// Present only when dense retrieval is enabled.
    dense: Option<Arc<dyn Retriever>>,
    /// Present only when sparse retrieval is enabled.
    sparse: Option<Arc<dyn Retriever>>,
}

impl HybridSearcher {
    /// Build a searcher.
    ///
    /// Fails when `fusion_method` is not a supported method, or when a
    /// retrieval side is enabled but no retriever is supplied for it. A
    /// retriever supplied for a disabled side is ignored.
    pub fn new(
        config: HybridSearchConfig,
        fusion: FusionConfig,
        dense: Option<Arc<dyn Retriever>>,
        sparse: Option<Arc<dyn Retriever>>,
    ) -> Result<Self, SearchError> {
        let method = config
            .method()
            .map_err(|e| SearchError::InvalidConfig(e.to_string()))?;

        let dense = Self::select(RetrieverKind::Dense, config.enable_dense, dense)?;
        let sparse = Self::select(RetrieverKind::Sparse, config.enable_sparse, sparse)?;

        info!(
            "Hybrid searcher ready: method={}, dense={}, sparse={}, parallel={}",
            method,
            dense.is_some(),
            sparse.is_some(),
            config.parallel_execution
        );

        Ok(Self {
            config,
            fusion,
            method,
            dense,
            sparse,
        })
    }

    fn select(
        kind: RetrieverKind,
        enabled: bool,
        retriever: Option<Arc<dyn Retriever>>,
    ) -> Result<Option<Arc<dyn Retriever>>, SearchError> {
        match (enabled, retriever) {
            (true, Some(retriever)) => Ok(Some(retriever)),
            (true, None) => Err(SearchError::InvalidConfig(format!(
                "{} retrieval is enabled but no {} retriever was supplied",
                kind, kind
            ))),
            (false, Some(_)) => {
                debug!("{} retrieval is disabled, ignoring supplied retriever", kind);
                Ok(None)
            }
            (false, None) => Ok(None),
        }
    }

    pub fn config(&self) -> &HybridSearchConfig {
        &self.config
    }

    pub fn fusion_config(&self) -> &FusionConfig {
        &self.fusion
    }

    pub fn method(&self) -> FusionMethod {
        self.method
    }

    fn retriever(&self, kind: RetrieverKind) -> Option<&Arc<dyn Retriever>> {
        match kind {
            RetrieverKind::Dense => self.dense.as_ref(),
            RetrieverKind::Sparse => self.sparse.as_ref(),
        }
    }

    fn enabled(&self) -> impl Iterator<Item = (RetrieverKind, &Arc<dyn Retriever>)> {
        [RetrieverKind::Dense, RetrieverKind::Sparse]
            .into_iter()
            .filter_map(move |kind| self.retriever(kind).map(|retriever| (kind, retriever)))
    }

    /// Index chunks in every enabled retriever. An empty slice is a no-op.
    pub async fn add_documents(&self, chunks: &[Arc<DocumentChunk>]) -> Result<(), SearchError> {
        if chunks.is_empty() {
            debug!("add_documents called with no chunks");
            return Ok(());
        }

        for (kind, retriever) in self.enabled() {
            retriever
                .add_documents(chunks)
                .await
                .map_err(|e| SearchError::retriever(kind, e))?;
        }

        debug!("Indexed {} chunks", chunks.len());
        Ok(())
    }

    /// Search both retrievers and fuse their results.
    ///
    /// Returns at most `top_k` results, or `top_k_final` when `top_k` is
    /// `None`. A retriever failure fails the whole call; under parallel
    /// execution both retrievers are still awaited first.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }
        let limit = top_k.unwrap_or(self.config.top_k_final);

        let (dense, sparse) = if self.config.parallel_execution {
            let (dense, sparse) = tokio::join!(
                self.retrieve(RetrieverKind::Dense, query),
                self.retrieve(RetrieverKind::Sparse, query)
            );
            (dense?, sparse?)
        } else {
            let dense = self.retrieve(RetrieverKind::Dense, query).await?;
            let sparse = self.retrieve(RetrieverKind::Sparse, query).await?;
            (dense, sparse)
        };

        let mut results = match (dense, sparse) {
            (Some(dense), Some(sparse)) => fuse(self.method, &dense, &sparse, &self.fusion),
            (Some(mut only), None) | (None, Some(mut only)) => {
                assign_ranks(&mut only);
                only
            }
            (None, None) => {
                debug!("No retriever enabled, returning no results");
                Vec::new()
            }
        };

        results.truncate(limit);
        debug!("Hybrid search returned {} results", results.len());
        Ok(results)
    }

    /// Query one side, drop results under its threshold and repeated chunks.
    /// `None` when that side is disabled.
    async fn retrieve(
        &self,
        kind: RetrieverKind,
        query: &str,
    ) -> Result<Option<Vec<SearchResult>>, SearchError> {
        let Some(retriever) = self.retriever(kind) else {
            return Ok(None);
        };
        let (top_k, threshold) = match kind {
            RetrieverKind::Dense => (self.config.top_k_dense, self.config.dense_threshold),
            RetrieverKind::Sparse => (self.config.top_k_sparse, self.config.sparse_threshold),
        };

        let raw = retriever
            .search(query, top_k)
            .await
            .map_err(|e| SearchError::retriever(kind, e))?;
        let returned = raw.len();

        let mut results: Vec<SearchResult> = raw
            .into_iter()
            .filter(|result| result.score >= threshold)
            .collect();
        results = deduplicate_results(results);

        for result in &mut results {
            if result.explanation.is_empty() {
                result.explanation = format!("{}#{}", kind, result.rank);
            }
        }

        debug!(
            "{} retriever returned {} results, {} kept",
            kind,
            returned,
            results.len()
        );
        Ok(Some(results))
    }

    /// Largest document count among the enabled retrievers.
    pub fn document_count(&self) -> usize {
        self.enabled()
            .map(|(_, retriever)| retriever.document_count())
            .max()
            .unwrap_or(0)
    }

    pub fn get_retriever_status(&self) -> RetrieverStatus {
        RetrieverStatus {
            dense_enabled: self.dense.is_some(),
            sparse_enabled: self.sparse.is_some(),
            fusion_method: self.method,
            parallel_execution: self.config.parallel_execution,
            dense_document_count: self.dense.as_ref().map_or(0, |r| r.document_count()),
            sparse_document_count: self.sparse.as_ref().map_or(0, |r| r.document_count()),
        }
    }

    /// Drop every indexed chunk from the enabled retrievers.
    pub async fn clear(&self) -> Result<(), SearchError> {
        for (kind, retriever) in self.enabled() {
            retriever
                .clear()
                .await
                .map_err(|e| SearchError::retriever(kind, e))?;
        }
        info!("Hybrid searcher cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "searcher_tests.rs"]
mod tests;
