//! Embedding cache configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::default_true;

/// Two-tier embedding cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Global switch. When off, lookups miss and writes are dropped.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TTL applied when a caller does not pass one.
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,

    /// Maximum in-flight single-item operations per batch call.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    /// In-process tier (L1).
    #[serde(default)]
    pub memory: MemoryCacheConfig,

    /// Optional remote tier (L2).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteCacheConfig>,
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_seconds: default_ttl_seconds(),
            batch_concurrency: default_batch_concurrency(),
            memory: MemoryCacheConfig::default(),
            remote: None,
        }
    }
}

fn default_ttl_seconds() -> u64 {
    86_400
}

fn default_batch_concurrency() -> usize {
    16
}

/// Bounds for the in-process LRU tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Entry count ceiling.
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Accounted byte ceiling.
    #[serde(default = "default_max_memory_bytes")]
    pub max_memory_bytes: usize,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            max_memory_bytes: default_max_memory_bytes(),
        }
    }
}

fn default_max_size() -> usize {
    10_000
}

fn default_max_memory_bytes() -> usize {
    512 * 1024 * 1024
}

/// Remote key-value tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCacheConfig {
    /// Connection endpoint, e.g. `redis://127.0.0.1:6379/0`.
    pub endpoint: String,

    /// Namespace prepended to every key; `clear` only touches this prefix.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Upper bound on how long any entry lives in the remote store.
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u64,

    /// Deadline for a single remote call; an elapsed call reads as a miss.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Keys requested per scan page during `clear`.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
}

impl RemoteCacheConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            key_prefix: default_key_prefix(),
            default_ttl_seconds: default_ttl_seconds(),
            operation_timeout_ms: default_operation_timeout_ms(),
            scan_batch_size: default_scan_batch_size(),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_scan_batch_size(mut self, size: usize) -> Self {
        self.scan_batch_size = size;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl_seconds = ttl.as_secs();
        self
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

fn default_key_prefix() -> String {
    "docsearch:embeddings".to_string()
}

fn default_operation_timeout_ms() -> u64 {
    500
}

fn default_scan_batch_size() -> usize {
    100
}
