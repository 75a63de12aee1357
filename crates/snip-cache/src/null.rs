use async_trait::async_trait;
use snip_core::cache::Result;
use snip_core::{CacheKey, ShortenedUrl, UrlCache};
use std::time::Duration;
use tracing::debug;

/// A cache that never holds anything.
///
/// Used when caching is disabled: every lookup is a miss and every write is
/// dropped, so all traffic goes to the store.
#[derive(Debug, Clone, Copy)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for NullCache {
    async fn get(&self, _key: &CacheKey<'_>) -> Result<Option<ShortenedUrl>> {
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey<'_>, _record: &ShortenedUrl, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_misses() {
        let cache = NullCache::new();
        let key = CacheKey::Token("abcd");
        let record = ShortenedUrl::new(1, "https://example.org");

        cache
            .set(&key, &record, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }
}
