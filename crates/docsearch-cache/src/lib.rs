//! Two-tier embedding cache.
//!
//! Stores embedding vectors keyed by a digest of their normalized source text,
//! so callers can skip re-embedding text they have seen before.
//!
//! ## Tiers
//!
//! - **L1** ([`MemoryCacheBackend`]): bounded LRU with TTL and a byte ceiling
//! - **L2** ([`RemoteCacheBackend`], optional): namespaced TTL cache fronting an
//!   external key-value store; failures degrade to misses
//!
//! ## Lookup Order
//!
//! 1. L1 is checked first
//! 2. On an L1 miss, L2 is checked if configured
//! 3. An L2 hit is promoted into L1 before it is returned

mod embedding_cache;
mod key;
mod local_store;
mod memory;
mod remote;

pub use embedding_cache::{CacheStats, EmbeddingCache};
pub use key::cache_key;
pub use local_store::LocalKeyValueStore;
pub use memory::{CacheEntry, MemoryCacheBackend};
pub use remote::RemoteCacheBackend;
