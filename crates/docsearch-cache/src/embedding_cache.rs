//! Two-tier embedding cache façade.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use docsearch_config::CacheConfig;
use docsearch_protocols::{CacheBackend, CacheError, DocumentChunk, Embedding, KeyValueClient};

use crate::key::cache_key;
use crate::memory::MemoryCacheBackend;
use crate::remote::RemoteCacheBackend;

/// Counters reported by [`EmbeddingCache::get_stats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// LRU evictions performed by the L1 tier.
    pub evictions: u64,
    pub total_requests: u64,
    /// `hits / total_requests`, or 0.0 before the first request.
    pub hit_rate: f64,
    /// Accounted bytes held by the L1 tier.
    pub memory_usage_bytes: usize,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    total: AtomicU64,
}

impl Counters {
    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
    }
}

/// Embedding cache over a required L1 tier and an optional L2 tier.
///
/// Keys are derived from the text with [`cache_key`], so texts that differ
/// only in case or surrounding whitespace share one entry.
pub struct EmbeddingCache {
    l1: Arc<dyn CacheBackend>,
    l2: Option<Arc<dyn CacheBackend>>,
    enabled: bool,
    default_ttl: Duration,
    batch_concurrency: usize,
    counters: Counters,
}

impl EmbeddingCache {
    /// Assemble a cache from already-built tiers.
    pub fn new(
        l1: Arc<dyn CacheBackend>,
        l2: Option<Arc<dyn CacheBackend>>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            l1,
            l2,
            enabled: config.enabled,
            default_ttl: config.default_ttl(),
            batch_concurrency: config.batch_concurrency.max(1),
            counters: Counters::default(),
        }
    }

    /// Build both tiers from configuration.
    ///
    /// The remote tier is created only when `config.remote` is set, and is
    /// probed before this returns. An unreachable store leaves the tier in
    /// place but unavailable.
    pub async fn from_config(
        config: &CacheConfig,
        remote_client: Option<Arc<dyn KeyValueClient>>,
    ) -> Self {
        let l1: Arc<dyn CacheBackend> = Arc::new(MemoryCacheBackend::from_config(&config.memory));

        let l2 = match &config.remote {
            Some(remote_config) => {
                let remote = RemoteCacheBackend::new(remote_client, remote_config.clone());
                remote.initialize().await;
                Some(Arc::new(remote) as Arc<dyn CacheBackend>)
            }
            None => None,
        };

        info!(
            "Embedding cache ready: enabled={}, l1 max_size={}, l2={}",
            config.enabled,
            config.memory.max_size,
            l2.is_some()
        );

        Self::new(l1, l2, config)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up the embedding for `text`.
    ///
    /// Every call is counted, including calls on a disabled cache, which
    /// always miss.
    pub async fn get(&self, text: &str) -> Option<Embedding> {
        self.counters.total.fetch_add(1, Ordering::Relaxed);

        let found = if self.enabled {
            self.lookup(&cache_key(text)).await
        } else {
            None
        };

        match found {
            Some(_) => self.counters.hits.fetch_add(1, Ordering::Relaxed),
            None => self.counters.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    async fn lookup(&self, key: &str) -> Option<Embedding> {
        if let Some(value) = self.l1.get(key).await {
            return Some(value);
        }

        let l2 = self.l2.as_ref()?;
        let value = l2.get(key).await?;
        debug!("Promoting {} from {} to {}", key, l2.name(), self.l1.name());
        self.l1.set(key, value.clone(), self.default_ttl).await;
        Some(value)
    }

    /// Store an embedding with the default TTL.
    pub async fn set(&self, text: &str, embedding: Embedding) {
        self.set_with_ttl(text, embedding, self.default_ttl).await;
    }

    /// Store an embedding in every configured tier.
    pub async fn set_with_ttl(&self, text: &str, embedding: Embedding, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let key = cache_key(text);
        match &self.l2 {
            Some(l2) => {
                self.l1.set(&key, embedding.clone(), ttl).await;
                l2.set(&key, embedding, ttl).await;
            }
            None => self.l1.set(&key, embedding, ttl).await,
        }
    }

    /// Look up several texts, returning one slot per text in input order.
    pub async fn get_many(&self, texts: &[&str]) -> Vec<Option<Embedding>> {
        stream::iter(texts.iter().copied())
            .map(|text| self.get(text))
            .buffered(self.batch_concurrency)
            .collect()
            .await
    }

    /// Look up several texts at once. Duplicate texts collapse to one entry.
    pub async fn get_batch(&self, texts: &[&str]) -> HashMap<String, Option<Embedding>> {
        let found = self.get_many(texts).await;
        texts
            .iter()
            .map(|text| text.to_string())
            .zip(found)
            .collect()
    }

    /// Store several embeddings, pairing `texts` and `embeddings` by index.
    pub async fn set_batch(
        &self,
        texts: &[&str],
        embeddings: Vec<Embedding>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        if texts.len() != embeddings.len() {
            return Err(CacheError::LengthMismatch {
                texts: texts.len(),
                embeddings: embeddings.len(),
            });
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        stream::iter(texts.iter().copied().zip(embeddings))
            .for_each_concurrent(self.batch_concurrency, |(text, embedding)| {
                self.set_with_ttl(text, embedding, ttl)
            })
            .await;
        Ok(())
    }

    /// Remove `text` from every tier. True if any tier held it.
    pub async fn delete(&self, text: &str) -> bool {
        let key = cache_key(text);
        let in_l1 = self.l1.delete(&key).await;
        let in_l2 = match &self.l2 {
            Some(l2) => l2.delete(&key).await,
            None => false,
        };
        in_l1 || in_l2
    }

    /// Empty both tiers and reset the counters.
    pub async fn clear(&self) {
        self.l1.clear().await;
        if let Some(l2) = &self.l2 {
            l2.clear().await;
        }
        self.counters.reset();
        info!("Embedding cache cleared");
    }

    pub async fn get_stats(&self) -> CacheStats {
        let l1 = self.l1.stats().await;
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let total_requests = self.counters.total.load(Ordering::Relaxed);
        let hit_rate = if total_requests == 0 {
            0.0
        } else {
            hits as f64 / total_requests as f64
        };

        CacheStats {
            hits,
            misses,
            evictions: l1.evictions,
            total_requests,
            hit_rate,
            memory_usage_bytes: l1.memory_bytes,
        }
    }

    /// Cached embeddings for each chunk's content, index for index.
    pub async fn get_document_chunks(&self, chunks: &[Arc<DocumentChunk>]) -> Vec<Option<Embedding>> {
        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.content.as_str()).collect();
        self.get_many(&texts).await
    }

    /// Store one embedding per chunk, keyed by the chunk's content.
    pub async fn set_document_chunks(
        &self,
        chunks: &[Arc<DocumentChunk>],
        embeddings: Vec<Embedding>,
    ) -> Result<(), CacheError> {
        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.content.as_str()).collect();
        self.set_batch(&texts, embeddings, None).await
    }
}

#[cfg(test)]
#[path = "embedding_cache_tests.rs"]
mod tests;
