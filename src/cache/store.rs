//! Cache store contract and the bundled in-memory backend.
//!
//! The invalidation policy and read-through middleware only see
//! `dyn CacheStore`; `MemoryStore` is the backend wired up by the binary.

use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use thiserror::Error;

use super::config::CacheConfig;
use super::keys::{CacheKey, KeyPattern};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";
const METRIC_CACHE_EVICT_TOTAL: &str = "quillpost_cache_evict_total";

/// Failure reported by a cache backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation `{op}` failed: {message}")]
    Operation { op: &'static str, message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn operation(op: &'static str, message: impl Into<String>) -> Self {
        Self::Operation {
            op,
            message: message.into(),
        }
    }
}

/// Serialized payload with an expiry deadline.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Bytes,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    pub fn new(payload: Bytes, ttl: Duration) -> Self {
        Self {
            payload,
            // A TTL too large to represent never expires.
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Time left before expiry; `None` for entries that never expire.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Key-value backend used for read-through response caching.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry. Expired entries are reported as a miss.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError>;

    /// Store `payload` under `key` for `ttl`.
    async fn set(&self, key: &CacheKey, payload: Bytes, ttl: Duration) -> Result<(), StoreError>;

    /// Delete every key selected by `pattern`, returning how many were removed.
    async fn del(&self, pattern: &KeyPattern) -> Result<u64, StoreError>;

    /// Name of the backend for logs.
    fn provider_name(&self) -> &'static str;
}

/// In-memory LRU store with per-entry expiry.
pub struct MemoryStore {
    entries: RwLock<LruCache<String, CacheEntry>>,
}

impl MemoryStore {
    /// Create a store sized from the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_capacity(config.max_entries_non_zero())
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "purge_expired");
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is present regardless of expiry. Does not touch LRU order.
    pub fn contains(&self, key: &str) -> bool {
        rw_read(&self.entries, SOURCE, "contains").contains(key)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let live = entries
            .get(key.as_str())
            .map(|entry| (!entry.is_expired()).then(|| entry.clone()));
        match live {
            None => Ok(None),
            Some(Some(entry)) => Ok(Some(entry)),
            Some(None) => {
                entries.pop(key.as_str());
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &CacheKey, payload: Bytes, ttl: Duration) -> Result<(), StoreError> {
        let entry = CacheEntry::new(payload, ttl);
        let evicted =
            rw_write(&self.entries, SOURCE, "set").push(key.as_str().to_string(), entry);
        if let Some((evicted_key, _)) = evicted
            && evicted_key != key.as_str()
        {
            counter!(METRIC_CACHE_EVICT_TOTAL).increment(1);
        }
        Ok(())
    }

    async fn del(&self, pattern: &KeyPattern) -> Result<u64, StoreError> {
        let mut entries = rw_write(&self.entries, SOURCE, "del");
        let Some(prefix) = pattern.prefix() else {
            return Ok(u64::from(entries.pop(pattern.as_str()).is_some()));
        };

        let matched: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matched {
            entries.pop(key);
        }
        Ok(matched.len() as u64)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
