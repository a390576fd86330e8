//! Bounded in-process LRU tier.

use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use docsearch_config::MemoryCacheConfig;
use docsearch_protocols::{BackendStats, CacheBackend, Embedding};

/// A cached embedding plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: Embedding,
    pub created_at: Instant,
    /// `None` when `created_at + ttl` does not fit in an `Instant`.
    pub expires_at: Option<Instant>,
    pub hit_count: u64,
    pub size_bytes: usize,
}

impl CacheEntry {
    fn new(key: String, value: Embedding, ttl: Duration) -> Self {
        let created_at = Instant::now();
        let size_bytes = entry_size(&key, &value);
        Self {
            key,
            value,
            created_at,
            expires_at: created_at.checked_add(ttl),
            hit_count: 0,
            size_bytes,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}

/// Accounted size of an entry: the embedding's bytes plus the key.
fn entry_size(key: &str, value: &[f32]) -> usize {
    std::mem::size_of_val(value) + key.len()
}

struct Inner {
    /// Access order lives in the LRU list; capacity is enforced by hand.
    entries: LruCache<String, CacheEntry>,
    memory_bytes: usize,
    evictions: u64,
    expirations: u64,
}

impl Inner {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.pop(key)?;
        self.memory_bytes -= entry.size_bytes;
        Some(entry)
    }
}

/// In-process LRU cache with TTL and a memory-byte ceiling.
///
/// One mutex guards the map, the access order and the counters, so every
/// `get`/`set` observes and updates them atomically.
pub struct MemoryCacheBackend {
    inner: Mutex<Inner>,
    max_size: usize,
    max_memory_bytes: usize,
}

impl MemoryCacheBackend {
    /// Create a backend holding at most `max_size` entries and
    /// `max_memory_bytes` accounted bytes.
    pub fn new(max_size: usize, max_memory_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                memory_bytes: 0,
                evictions: 0,
                expirations: 0,
            }),
            max_size,
            max_memory_bytes,
        }
    }

    pub fn from_config(config: &MemoryCacheConfig) -> Self {
        Self::new(config.max_size, config.max_memory_bytes)
    }

    /// Number of stored entries, expired ones included until they are touched.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn memory_bytes(&self) -> usize {
        self.inner.lock().memory_bytes
    }

    /// Copy of an entry without touching its recency or hit count.
    pub fn peek_entry(&self, key: &str) -> Option<CacheEntry> {
        self.inner.lock().entries.peek(key).cloned()
    }

    /// Drop every expired entry now instead of waiting for a read.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.remove(key);
        }
        inner.expirations += expired.len() as u64;

        if !expired.is_empty() {
            debug!("Purged {} expired cache entries", expired.len());
        }
        expired.len()
    }

    fn lookup(&self, key: &str) -> Option<Embedding> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let expired = inner.entries.peek(key)?.is_expired(now);
        if expired {
            inner.remove(key);
            inner.expirations += 1;
            debug!("Cache entry expired on read: {}", key);
            return None;
        }

        // get_mut moves the key to the most-recently-used end
        let entry = inner.entries.get_mut(key)?;
        entry.hit_count += 1;
        Some(entry.value.clone())
    }

    fn insert(&self, key: &str, value: Embedding, ttl: Duration) {
        let entry = CacheEntry::new(key.to_string(), value, ttl);

        if self.max_size == 0 || entry.size_bytes > self.max_memory_bytes {
            warn!(
                "Embedding of {} bytes cannot fit in cache (max_size={}, max_memory_bytes={})",
                entry.size_bytes, self.max_size, self.max_memory_bytes
            );
            return;
        }

        let mut inner = self.inner.lock();
        inner.remove(key);

        while inner.entries.len() >= self.max_size
            || inner.memory_bytes + entry.size_bytes > self.max_memory_bytes
        {
            match inner.entries.pop_lru() {
                Some((evicted_key, evicted)) => {
                    inner.memory_bytes -= evicted.size_bytes;
                    inner.evictions += 1;
                    debug!("Evicted least recently used cache entry: {}", evicted_key);
                }
                None => break,
            }
        }

        inner.memory_bytes += entry.size_bytes;
        inner.entries.put(key.to_string(), entry);
    }
}

impl Default for MemoryCacheBackend {
    fn default() -> Self {
        Self::from_config(&MemoryCacheConfig::default())
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Option<Embedding> {
        self.lookup(key)
    }

    async fn set(&self, key: &str, value: Embedding, ttl: Duration) {
        self.insert(key, value, ttl);
    }

    async fn delete(&self, key: &str) -> bool {
        self.inner.lock().remove(key).is_some()
    }

    async fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.memory_bytes = 0;
        inner.evictions = 0;
        inner.expirations = 0;
    }

    async fn stats(&self) -> BackendStats {
        let inner = self.inner.lock();
        BackendStats {
            size: Some(inner.entries.len()),
            memory_bytes: inner.memory_bytes,
            max_size: Some(self.max_size),
            max_memory_bytes: Some(self.max_memory_bytes),
            evictions: inner.evictions,
            expirations: inner.expirations,
            available: true,
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
