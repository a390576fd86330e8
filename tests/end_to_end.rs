//! Configuration through cache and search, with in-process collaborators.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use docsearch::{
    Config, ConfigLoader, ConfigValidator, DocumentChunk, Embedding, EmbeddingError,
    EmbeddingProvider, Error, LocalKeyValueStore, RemoteCacheConfig, RetrievalCore, Retriever,
    RetrieverError, SearchError, SearchResult,
};

/// Scores chunks by the share of query terms found in their content.
#[derive(Default)]
struct TermRetriever {
    chunks: Mutex<Vec<Arc<DocumentChunk>>>,
}

#[async_trait]
impl Retriever for TermRetriever {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, RetrieverError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let mut results: Vec<SearchResult> = self
            .chunks
            .lock()
            .iter()
            .filter_map(|chunk| {
                let content = chunk.content.to_lowercase();
                let matched = terms.iter().filter(|t| content.contains(t.as_str())).count();
                (matched > 0).then(|| {
                    SearchResult::new(chunk.clone(), matched as f32 / terms.len() as f32)
                })
            })
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        results.truncate(top_k);
        for (position, result) in results.iter_mut().enumerate() {
            result.rank = position + 1;
        }
        Ok(results)
    }

    async fn add_documents(&self, chunks: &[Arc<DocumentChunk>]) -> Result<(), RetrieverError> {
        self.chunks.lock().extend(chunks.iter().cloned());
        Ok(())
    }

    fn document_count(&self) -> usize {
        self.chunks.lock().len()
    }

    async fn clear(&self) -> Result<(), RetrieverError> {
        self.chunks.lock().clear();
        Ok(())
    }
}

/// Returns fixed scores per document id for every query.
struct FixedRetriever {
    scores: HashMap<&'static str, f32>,
    inner: TermRetriever,
}

impl FixedRetriever {
    fn new(scores: &[(&'static str, f32)]) -> Self {
        Self {
            scores: scores.iter().copied().collect(),
            inner: TermRetriever::default(),
        }
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<SearchResult>, RetrieverError> {
        let mut results: Vec<SearchResult> = self
            .inner
            .chunks
            .lock()
            .iter()
            .filter_map(|chunk| {
                self.scores
                    .get(chunk.document_id.as_str())
                    .map(|score| SearchResult::new(chunk.clone(), *score))
            })
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        results.truncate(top_k);
        for (position, result) in results.iter_mut().enumerate() {
            result.rank = position + 1;
        }
        Ok(results)
    }

    async fn add_documents(&self, chunks: &[Arc<DocumentChunk>]) -> Result<(), RetrieverError> {
        self.inner.add_documents(chunks).await
    }

    fn document_count(&self) -> usize {
        self.inner.document_count()
    }

    async fn clear(&self) -> Result<(), RetrieverError> {
        self.inner.clear().await
    }
}

/// Embeds text as `[len, word count]` and counts how many texts it saw.
#[derive(Default)]
struct CountingProvider {
    embedded: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for CountingProvider {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| vec![text.len() as f32, text.split_whitespace().count() as f32])
            .collect())
    }

    fn dimension(&self) -> usize {
        2
    }
}

/// Provider that drops the last embedding.
struct ShortProvider;

#[async_trait]
impl EmbeddingProvider for ShortProvider {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().skip(1).map(|_| vec![0.0]).collect())
    }

    fn dimension(&self) -> usize {
        1
    }
}

fn default_config() -> Config {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
    ConfigLoader::load(&path).unwrap()
}

fn documents() -> Vec<Arc<DocumentChunk>> {
    vec![
        Arc::new(DocumentChunk::new("A", 0, "ownership and borrowing in rust")),
        Arc::new(DocumentChunk::new("B", 0, "memory safety without garbage collection")),
        Arc::new(DocumentChunk::new("C", 0, "borrowing rules for references")),
    ]
}

async fn core_with(config: &Config) -> (RetrievalCore, Arc<LocalKeyValueStore>) {
    let dense = Arc::new(FixedRetriever::new(&[("B", 0.95), ("A", 0.75)]));
    let sparse = Arc::new(TermRetriever::default());
    let store = Arc::new(LocalKeyValueStore::new());
    let core = RetrievalCore::from_config(config, Some(dense), Some(sparse), Some(store.clone()))
        .await
        .unwrap();
    (core, store)
}

async fn core_sharing(config: &Config, store: Arc<LocalKeyValueStore>) -> RetrievalCore {
    RetrievalCore::from_config(
        config,
        Some(Arc::new(FixedRetriever::new(&[]))),
        Some(Arc::new(TermRetriever::default())),
        Some(store),
    )
    .await
    .unwrap()
}

#[test]
fn test_shipped_config_is_clean() {
    let config = default_config();
    let result = ConfigValidator::validate(&config);

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert!(config.cache.remote.is_none());
}

#[tokio::test]
async fn test_hybrid_search_end_to_end() {
    let (core, _) = core_with(&default_config()).await;
    core.index(&documents()).await.unwrap();

    // Sparse matches A on both terms and C on one
    let results = core.search("ownership borrowing", None).await.unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.chunk.document_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(results[0].rank, 1);
    assert_eq!(core.searcher().document_count(), 3);
}

#[tokio::test]
async fn test_empty_query_surfaces_validation_error() {
    let (core, _) = core_with(&default_config()).await;

    let err = core.search("  ", None).await.unwrap_err();

    assert!(matches!(err, Error::Search(SearchError::InvalidQuery(_))));
}

#[tokio::test]
async fn test_embed_with_cache_only_embeds_misses() {
    let (core, _) = core_with(&default_config()).await;
    let provider = CountingProvider::default();

    let first = core
        .embed_with_cache(&provider, &["rust borrow checker", "lifetimes"])
        .await
        .unwrap();
    assert_eq!(provider.embedded.load(Ordering::SeqCst), 2);

    let second = core
        .embed_with_cache(&provider, &["Rust Borrow Checker ", "traits", "lifetimes"])
        .await
        .unwrap();

    assert_eq!(provider.embedded.load(Ordering::SeqCst), 3);
    assert_eq!(second[0], first[0]);
    assert_eq!(second[1], vec![6.0, 1.0]);
    assert_eq!(second[2], first[1]);

    let stats = core.cache().get_stats().await;
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 3);
}

#[tokio::test]
async fn test_embed_with_cache_rejects_short_provider_output() {
    let (core, _) = core_with(&default_config()).await;

    let err = core
        .embed_with_cache(&ShortProvider, &["a", "b"])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Embedding(EmbeddingError::Failed(_))));
}

#[tokio::test]
async fn test_remote_tier_shared_between_cores() {
    let mut config = default_config();
    config.cache.remote = Some(RemoteCacheConfig::new("local://shared").with_key_prefix("e2e"));
    let store = Arc::new(LocalKeyValueStore::new());

    let writer = core_sharing(&config, store.clone()).await;
    let reader = core_sharing(&config, store.clone()).await;

    writer.cache().set("shared text", vec![0.5, 0.25]).await;

    // Served by the remote tier, then promoted into the reader's L1
    assert_eq!(reader.cache().get("shared text").await, Some(vec![0.5, 0.25]));
    assert!(reader.cache().get_stats().await.memory_usage_bytes > 0);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let mut config = default_config();
    config.search.hybrid.fusion_method = "borda".to_string();
    config.search.fusion.rrf_k = 0.0;

    let err = RetrievalCore::from_config(
        &config,
        Some(Arc::new(TermRetriever::default())),
        Some(Arc::new(TermRetriever::default())),
        None,
    )
    .await
    .err()
    .unwrap();

    match err {
        Error::InvalidConfig(problems) => assert_eq!(problems.len(), 2),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_clear_empties_everything() {
    let (core, _) = core_with(&default_config()).await;
    core.index(&documents()).await.unwrap();
    core.cache().set("text", vec![1.0]).await;

    core.clear().await.unwrap();

    assert_eq!(core.searcher().document_count(), 0);
    assert!(core.cache().get("text").await.is_none());
    assert!(core.search("borrowing", None).await.unwrap().is_empty());
}
