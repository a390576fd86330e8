//! Assembly of the cache and the searcher from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use docsearch_cache::EmbeddingCache;
use docsearch_config::{Config, ConfigValidator};
use docsearch_hybrid::HybridSearcher;
use docsearch_protocols::{
    DocumentChunk, Embedding, EmbeddingError, EmbeddingProvider, KeyValueClient, Retriever,
    SearchResult,
};

use crate::error::Error;

/// The embedding cache and hybrid searcher, built from one [`Config`].
pub struct RetrievalCore {
    cache: EmbeddingCache,
    searcher: HybridSearcher,
}

impl RetrievalCore {
    pub fn new(cache: EmbeddingCache, searcher: HybridSearcher) -> Self {
        Self { cache, searcher }
    }

    /// Validate `config` and build both components.
    ///
    /// Validation warnings are logged; any validation error fails the call
    /// before anything is built. The remote cache tier, if configured, is
    /// probed here.
    pub async fn from_config(
        config: &Config,
        dense: Option<Arc<dyn Retriever>>,
        sparse: Option<Arc<dyn Retriever>>,
        remote_client: Option<Arc<dyn KeyValueClient>>,
    ) -> Result<Self, Error> {
        let validation = ConfigValidator::validate(config);
        for warning in &validation.warnings {
            warn!("Config warning at {}: {}", warning.path, warning.message);
        }
        if !validation.is_valid() {
            return Err(Error::InvalidConfig(
                validation.errors.iter().map(ToString::to_string).collect(),
            ));
        }

        let searcher = HybridSearcher::new(
            config.search.hybrid.clone(),
            config.search.fusion.clone(),
            dense,
            sparse,
        )?;
        let cache = EmbeddingCache::from_config(&config.cache, remote_client).await;

        info!("Retrieval core initialized");
        Ok(Self::new(cache, searcher))
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn searcher(&self) -> &HybridSearcher {
        &self.searcher
    }

    /// Embeddings for `texts`, in order, calling `provider` only for the
    /// texts the cache misses and caching what it returns.
    pub async fn embed_with_cache(
        &self,
        provider: &dyn EmbeddingProvider,
        texts: &[&str],
    ) -> Result<Vec<Embedding>, Error> {
        let cached = self.cache.get_many(texts).await;

        let missing: Vec<&str> = texts
            .iter()
            .zip(&cached)
            .filter(|(_, slot)| slot.is_none())
            .map(|(text, _)| *text)
            .collect();
        if missing.is_empty() {
            return Ok(cached.into_iter().flatten().collect());
        }

        let fresh = provider.embed(&missing).await?;
        if fresh.len() != missing.len() {
            return Err(EmbeddingError::Failed(format!(
                "provider returned {} embeddings for {} texts",
                fresh.len(),
                missing.len()
            ))
            .into());
        }
        self.cache.set_batch(&missing, fresh.clone(), None).await?;

        let mut fresh = fresh.into_iter();
        let embeddings: Vec<Embedding> = cached
            .into_iter()
            .filter_map(|slot| slot.or_else(|| fresh.next()))
            .collect();
        Ok(embeddings)
    }

    /// Index chunks in the enabled retrievers.
    pub async fn index(&self, chunks: &[Arc<DocumentChunk>]) -> Result<(), Error> {
        self.searcher.add_documents(chunks).await?;
        Ok(())
    }

    pub async fn search(&self, query: &str, top_k: Option<usize>) -> Result<Vec<SearchResult>, Error> {
        Ok(self.searcher.search(query, top_k).await?)
    }

    /// Empty the cache and every retriever index.
    pub async fn clear(&self) -> Result<(), Error> {
        self.cache.clear().await;
        self.searcher.clear().await?;
        Ok(())
    }
}
