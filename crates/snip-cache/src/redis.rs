use async_trait::async_trait;
use redis::AsyncCommands;
use snip_core::cache::Result;
use snip_core::{CacheError, CacheKey, ShortenedUrl, UrlCache};
use std::time::Duration;
use tracing::{debug, trace, warn};

const DEFAULT_KEY_PREFIX: &str = "snip:";

/// A Redis-based implementation of [`UrlCache`].
///
/// Records are stored as JSON strings with `SET ... EX`, so Redis itself
/// drops them once the TTL elapses. Keys are `<prefix><namespace>:<value>`.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

/// Redis expiries have one-second granularity and `EX 0` is rejected.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache using the `snip:` key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a multiplexed connection to `url` and wraps it.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| map_redis_error("invalid Redis url", e))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::new(conn))
    }

    fn redis_key(&self, key: &CacheKey<'_>) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get(&self, key: &CacheKey<'_>) -> Result<Option<ShortenedUrl>> {
        let redis_key = self.redis_key(key);
        trace!(key = %key, "Fetching record from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&redis_key).await {
            Ok(Some(cached)) => {
                debug!(key = %key, "Cache hit in Redis");
                match serde_json::from_str::<ShortenedUrl>(&cached) {
                    Ok(record) => Ok(Some(record)),
                    Err(e) => {
                        warn!(key = %key, error = %e, "Failed to deserialize cached record");
                        Err(CacheError::InvalidData(format!(
                            "invalid cached value for key '{redis_key}': {e}"
                        )))
                    }
                }
            }
            Ok(None) => {
                trace!(key = %key, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set(&self, key: &CacheKey<'_>, record: &ShortenedUrl, ttl: Duration) -> Result<()> {
        let redis_key = self.redis_key(key);
        trace!(key = %key, "Storing record in Redis cache");

        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize record for caching");
                return Err(CacheError::Serialization(format!(
                    "failed to serialize cache value: {e}"
                )));
            }
        };

        let mut conn = self.conn.clone();
        match conn
            .set_ex::<_, _, ()>(&redis_key, json, ttl_seconds(ttl))
            .await
        {
            Ok(()) => {
                debug!(key = %key, ttl_secs = ttl_seconds(ttl), "Cached record in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to cache record in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }
}
