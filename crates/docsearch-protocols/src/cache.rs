//! Cache tier protocol definitions.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::types::Embedding;

/// One tier of the embedding cache.
///
/// Operations are infallible at this seam: an in-process tier cannot fail,
/// and a remote tier turns every failure into a miss or a no-op.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name used in logs ("memory", "remote").
    fn name(&self) -> &str;

    /// Look up a key. Expired entries read as absent.
    async fn get(&self, key: &str) -> Option<Embedding>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: Embedding, ttl: Duration);

    /// Remove a key, returning whether it was present.
    async fn delete(&self, key: &str) -> bool;

    /// Remove every entry owned by this tier.
    async fn clear(&self);

    /// Snapshot of the tier's accounting.
    async fn stats(&self) -> BackendStats;
}

/// Accounting snapshot reported by a cache tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendStats {
    /// Number of live entries, when the tier can count them cheaply.
    pub size: Option<usize>,
    /// Accounted bytes held by the tier.
    pub memory_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_bytes: Option<usize>,
    /// Entries removed to make room.
    pub evictions: u64,
    /// Entries removed because their TTL passed.
    pub expirations: u64,
    /// Whether the tier is serving requests.
    pub available: bool,
}

/// One page of a cursor-based key scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; `0` once the scan is complete.
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// Client for an external key-value store.
///
/// Injected into the remote cache tier. Implementations report failures as
/// [`CacheError`]; the tier decides how to degrade.
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Check connectivity.
    async fn ping(&self) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store a value with an expiry.
    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Delete a key, returning whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Incremental scan of keys matching a `prefix*` pattern, at most
    /// roughly `count` keys per page. Start with cursor `0`.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage, CacheError>;

    /// Delete a batch of keys, returning how many existed.
    async fn delete_many(&self, keys: &[String]) -> Result<usize, CacheError>;

    /// Release the connection.
    async fn close(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
