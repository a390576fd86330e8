//! Remote key-value tier.
//!
//! Fronts an external store through an injected [`KeyValueClient`]. The tier
//! never returns an error: a missing client, a failed ping, a failed call or
//! an elapsed deadline is logged and read as a miss or a no-op.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use docsearch_config::RemoteCacheConfig;
use docsearch_protocols::{BackendStats, CacheBackend, CacheError, Embedding, KeyValueClient};

/// Hard stop for a single `clear`, in scan pages.
const MAX_CLEAR_PAGES: usize = 100_000;

/// Namespaced TTL cache over an external key-value store.
pub struct RemoteCacheBackend {
    client: Option<Arc<dyn KeyValueClient>>,
    config: RemoteCacheConfig,
    available: AtomicBool,
}

impl RemoteCacheBackend {
    /// Create the tier. `client` is `None` when no store client is compiled
    /// in or configured; the tier then stays unavailable.
    ///
    /// Call [`initialize`](Self::initialize) before use.
    pub fn new(client: Option<Arc<dyn KeyValueClient>>, config: RemoteCacheConfig) -> Self {
        Self {
            client,
            config,
            available: AtomicBool::new(false),
        }
    }

    /// Probe the store and record whether the tier can serve requests.
    pub async fn initialize(&self) -> bool {
        let Some(client) = self.client.clone() else {
            warn!(
                "Remote cache client not present, continuing without L2 ({})",
                self.config.endpoint
            );
            self.available.store(false, Ordering::SeqCst);
            return false;
        };

        let timeout = self.config.operation_timeout();
        let available = match tokio::time::timeout(timeout, client.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Remote cache ping to {} failed: {}", self.config.endpoint, e);
                false
            }
            Err(_) => {
                warn!(
                    "Remote cache ping to {} timed out after {:?}",
                    self.config.endpoint, timeout
                );
                false
            }
        };

        self.available.store(available, Ordering::SeqCst);
        if available {
            info!(
                "Remote cache connected: {} (prefix '{}')",
                self.config.endpoint, self.config.key_prefix
            );
        }
        available
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &RemoteCacheConfig {
        &self.config
    }

    /// Release the connection. The tier is unavailable afterwards.
    pub async fn close(&self) {
        let was_available = self.available.swap(false, Ordering::SeqCst);
        if let Some(client) = self.client.as_ref().filter(|_| was_available) {
            if let Err(e) = client.close().await {
                warn!("Failed to close remote cache connection: {}", e);
            }
        }
        debug!("Remote cache closed: {}", self.config.endpoint);
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }

    fn client(&self) -> Option<&Arc<dyn KeyValueClient>> {
        if self.is_available() {
            self.client.as_ref()
        } else {
            None
        }
    }

    /// Run one store call under the operation deadline, absorbing failures.
    async fn call<T, F>(&self, operation: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        let timeout = self.config.operation_timeout();
        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(
                    "Remote cache {} failed (prefix '{}'): {}",
                    operation, self.config.key_prefix, e
                );
                None
            }
            Err(_) => {
                warn!(
                    "Remote cache {} failed (prefix '{}'): {}",
                    operation,
                    self.config.key_prefix,
                    CacheError::Timeout(timeout)
                );
                None
            }
        }
    }
}

#[async_trait]
impl CacheBackend for RemoteCacheBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn get(&self, key: &str) -> Option<Embedding> {
        let client = self.client()?;
        let key = self.namespaced(key);
        let bytes = self.call("get", client.get(&key)).await.flatten()?;

        match serde_json::from_slice::<Embedding>(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Remote cache entry {} is not a valid embedding: {}", key, e);
                None
            }
        }
    }

    /// Entries never outlive the tier's configured default TTL.
    async fn set(&self, key: &str, value: Embedding, ttl: Duration) {
        let Some(client) = self.client() else {
            return;
        };
        let bytes = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to serialize embedding for remote cache: {}", e);
                return;
            }
        };
        let key = self.namespaced(key);
        let ttl = ttl.min(self.config.default_ttl());
        self.call("set", client.set_ex(&key, bytes, ttl)).await;
    }

    async fn delete(&self, key: &str) -> bool {
        let Some(client) = self.client() else {
            return false;
        };
        let key = self.namespaced(key);
        self.call("delete", client.delete(&key)).await.unwrap_or(false)
    }

    /// Remove only keys under this tier's prefix, one scan page at a time.
    async fn clear(&self) {
        let Some(client) = self.client() else {
            return;
        };

        let pattern = format!("{}:*", self.config.key_prefix);
        let batch_size = self.config.scan_batch_size.max(1);
        let mut cursor = 0;
        let mut removed = 0;
        let mut pages = 0;

        loop {
            let Some(page) = self
                .call("scan", client.scan(cursor, &pattern, batch_size))
                .await
            else {
                break;
            };
            pages += 1;

            if !page.keys.is_empty() {
                removed += self
                    .call("delete_many", client.delete_many(&page.keys))
                    .await
                    .unwrap_or(0);
            }

            if page.cursor == 0 {
                break;
            }
            if page.keys.is_empty() && page.cursor == cursor {
                warn!(
                    "Remote cache scan under prefix '{}' stalled at cursor {}, stopping clear",
                    self.config.key_prefix, cursor
                );
                break;
            }
            cursor = page.cursor;
            if pages >= MAX_CLEAR_PAGES {
                warn!(
                    "Remote cache clear under prefix '{}' stopped after {} scan pages",
                    self.config.key_prefix, pages
                );
                break;
            }
        }

        debug!(
            "Cleared {} remote cache keys under prefix '{}'",
            removed, self.config.key_prefix
        );
    }

    async fn stats(&self) -> BackendStats {
        BackendStats {
            available: self.is_available(),
            ..BackendStats::default()
        }
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
