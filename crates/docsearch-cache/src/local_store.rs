//! In-process key-value store implementing [`KeyValueClient`].
//!
//! Lets the remote tier run without an external server, for development and
//! tests. Supports per-key expiry and cursor-based scans over `prefix*`
//! patterns.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use docsearch_protocols::{CacheError, KeyValueClient, ScanPage};

struct StoredValue {
    data: Vec<u8>,
    expires_at: Option<Instant>,
    /// Insertion sequence; scan cursors are expressed in these.
    seq: u64,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now <= expires_at)
    }
}

#[derive(Default)]
struct Store {
    values: HashMap<String, StoredValue>,
    next_seq: u64,
}

/// Key-value store held in process memory.
pub struct LocalKeyValueStore {
    store: Mutex<Store>,
    online: AtomicBool,
}

impl LocalKeyValueStore {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store {
                values: HashMap::new(),
                next_seq: 1,
            }),
            online: AtomicBool::new(true),
        }
    }

    /// Simulate losing or regaining the connection.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of live keys, across all prefixes.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.store
            .lock()
            .values
            .values()
            .filter(|v| v.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_online(&self) -> Result<(), CacheError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("local store is offline".to_string()))
        }
    }
}

impl Default for LocalKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Only trailing-`*` globs are understood; anything else matches exactly.
fn matches_pattern(key: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl KeyValueClient for LocalKeyValueStore {
    async fn ping(&self) -> Result<(), CacheError> {
        self.check_online()
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.check_online()?;
        let now = Instant::now();
        let mut store = self.store.lock();
        match store.values.get(key) {
            Some(value) if value.is_live(now) => Ok(Some(value.data.clone())),
            Some(_) => {
                store.values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.check_online()?;
        let mut store = self.store.lock();
        let seq = store.next_seq;
        store.next_seq += 1;
        store.values.insert(
            key.to_string(),
            StoredValue {
                data: value,
                expires_at: Instant::now().checked_add(ttl),
                seq,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.check_online()?;
        Ok(self.store.lock().values.remove(key).is_some())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage, CacheError> {
        self.check_online()?;
        let now = Instant::now();
        let store = self.store.lock();

        let mut candidates: Vec<(u64, &String)> = store
            .values
            .iter()
            .filter(|(key, value)| {
                value.seq >= cursor && value.is_live(now) && matches_pattern(key, pattern)
            })
            .map(|(key, value)| (value.seq, key))
            .collect();
        candidates.sort_unstable_by_key(|(seq, _)| *seq);

        let count = count.max(1);
        let next_cursor = candidates.get(count).map(|(seq, _)| *seq).unwrap_or(0);
        let keys = candidates
            .into_iter()
            .take(count)
            .map(|(_, key)| key.clone())
            .collect();

        Ok(ScanPage {
            cursor: next_cursor,
            keys,
        })
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize, CacheError> {
        self.check_online()?;
        let mut store = self.store.lock();
        Ok(keys
            .iter()
            .filter(|key| store.values.remove(key.as_str()).is_some())
            .count())
    }
}

#[cfg(test)]
#[path = "local_store_tests.rs"]
mod tests;
