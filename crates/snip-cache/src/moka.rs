use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use snip_core::cache::Result;
use snip_core::{CacheKey, ShortenedUrl, UrlCache};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    record: ShortenedUrl,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-process cache implementation using Moka.
///
/// Entries live in a bounded, concurrent in-memory cache and expire after
/// the TTL given to [`UrlCache::set`]. Overwriting an entry restarts its
/// TTL. Suitable for single-node deployments.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, Entry>,
}

impl MokaUrlCache {
    /// Creates a cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Creates a cache holding at most `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get(&self, key: &CacheKey<'_>) -> Result<Option<ShortenedUrl>> {
        trace!(key = %key, "Fetching record from Moka cache");

        match self.cache.get(&key.to_string()).await {
            Some(entry) => {
                debug!(key = %key, "Cache hit in Moka");
                Ok(Some(entry.record))
            }
            None => {
                trace!(key = %key, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &CacheKey<'_>, record: &ShortenedUrl, ttl: Duration) -> Result<()> {
        trace!(key = %key, "Storing record in Moka cache");

        let entry = Entry {
            record: record.clone(),
            ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Cached record in Moka");
        Ok(())
    }
}
