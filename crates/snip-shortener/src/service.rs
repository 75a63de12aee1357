use crate::config::ShortenerConfig;
use crate::error::{Result, ShortenerError};
use crate::shortener::Shortener;
use async_trait::async_trait;
use snip_core::{
    CacheKey, IdCodec, ReadRepository, Repository, ShortenedUrl, StorageError, UrlCache,
};
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, trace, warn};
use url::Url;

/// A concrete implementation of the [`Shortener`] trait.
///
/// Lookups go cache first, then store. The cache is best effort: every
/// cache call is bounded by `cache_timeout` and any failure is logged and
/// treated as a miss. Store failures abort the request as
/// [`ShortenerError::Internal`].
///
/// The duplicate pre-check is not a lock. When two creates for the same URL
/// race past it, the store's uniqueness constraint decides and the loser
/// reports [`ShortenerError::AlreadyExists`].
#[derive(Debug, Clone)]
pub struct ShortenerService<R, C, K> {
    repository: Arc<R>,
    cache: Arc<C>,
    codec: Arc<K>,
    config: ShortenerConfig,
}

impl<R: Repository, C: UrlCache, K: IdCodec> ShortenerService<R, C, K> {
    pub fn new(repository: R, cache: C, codec: K, config: ShortenerConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            codec: Arc::new(codec),
            config,
        }
    }

    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }

    /// Checks that `input` is an absolute http(s) URL that does not point
    /// back at this service, and returns it in normalized form.
    fn validate_url(&self, input: &str) -> Result<Url> {
        if input.trim().is_empty() {
            return Err(ShortenerError::InvalidInput(
                "url cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(input)
            .map_err(|e| ShortenerError::InvalidInput(format!("{input}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ShortenerError::InvalidInput(format!(
                "url scheme must be http or https: {}",
                url.scheme()
            )));
        }

        let Some(host) = url.host_str().filter(|host| !host.is_empty()) else {
            return Err(ShortenerError::InvalidInput(format!(
                "url must have a host: {input}"
            )));
        };

        if host == self.config.base_url.host() {
            return Err(ShortenerError::InvalidInput(
                "cannot shorten a url that points at this shortener".to_string(),
            ));
        }

        Ok(url)
    }

    fn short_url(&self, id: u64) -> Url {
        self.config.base_url.join(&self.codec.encode(id))
    }

    fn already_exists(&self, record: &ShortenedUrl) -> ShortenerError {
        ShortenerError::AlreadyExists {
            short_url: self.short_url(record.id).to_string(),
        }
    }

    async fn cache_get(&self, key: &CacheKey<'_>) -> Option<ShortenedUrl> {
        match timeout(self.config.cache_timeout, self.cache.get(key)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                warn!(key = %key, error = %e, "Cache lookup failed, treating as miss");
                None
            }
            Err(_) => {
                warn!(
                    key = %key,
                    timeout_ms = self.config.cache_timeout.as_millis() as u64,
                    "Cache lookup timed out, treating as miss"
                );
                None
            }
        }
    }

    async fn cache_put(&self, key: &CacheKey<'_>, record: &ShortenedUrl) {
        let write = self.cache.set(key, record, self.config.cache_ttl);
        match timeout(self.config.cache_timeout, write).await {
            Ok(Ok(())) => trace!(key = %key, "Wrote record through to cache"),
            Ok(Err(e)) => warn!(key = %key, error = %e, "Cache write failed, ignoring"),
            Err(_) => warn!(key = %key, "Cache write timed out, ignoring"),
        }
    }

    async fn store<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = snip_core::repository::Result<T>>,
    ) -> std::result::Result<T, StorageError> {
        match timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(format!(
                "{operation} did not complete within {:?}",
                self.config.store_timeout
            ))),
        }
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache, K: IdCodec> Shortener for ShortenerService<R, C, K> {
    async fn shorten(&self, original_url: &str) -> Result<Url> {
        let url = self.validate_url(original_url)?;
        let original_url = url.as_str();
        let key = CacheKey::OriginalUrl(original_url);

        if let Some(existing) = self.cache_get(&key).await {
            debug!(id = existing.id, "Duplicate url found in cache");
            return Err(self.already_exists(&existing));
        }

        let found = self
            .store(
                "find_by_original_url",
                self.repository.find_by_original_url(original_url),
            )
            .await?;
        if let Some(existing) = found {
            debug!(id = existing.id, "Duplicate url found in store");
            self.cache_put(&key, &existing).await;
            return Err(self.already_exists(&existing));
        }

        let record = match self.store("save", self.repository.save(original_url)).await {
            Ok(record) => record,
            Err(StorageError::Conflict(detail)) => {
                debug!("Lost a concurrent create for the same url");
                let winner = self
                    .store(
                        "find_by_original_url",
                        self.repository.find_by_original_url(original_url),
                    )
                    .await?;
                return Err(match winner {
                    Some(existing) => {
                        self.cache_put(&key, &existing).await;
                        self.already_exists(&existing)
                    }
                    None => StorageError::Conflict(detail).into(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.codec.encode(record.id);
        self.cache_put(&key, &record).await;
        self.cache_put(&CacheKey::Token(token.as_str()), &record).await;

        let short_url = self.config.base_url.join(&token);
        debug!(id = record.id, token = %token, "Shortened url");
        Ok(short_url)
    }

    async fn resolve(&self, token: &str) -> Result<String> {
        trace!(token, "Resolving token");

        let Some(id) = self.codec.decode(token) else {
            trace!(token, "Token does not decode");
            return Err(ShortenerError::NotFound);
        };

        let key = CacheKey::Token(token);
        if let Some(record) = self.cache_get(&key).await {
            debug!(token, id, "Resolved token from cache");
            return Ok(record.original_url);
        }

        let Some(record) = self.store("find_by_id", self.repository.find_by_id(id)).await? else {
            trace!(token, id, "No record for decoded id");
            return Err(ShortenerError::NotFound);
        };

        self.cache_put(&key, &record).await;
        debug!(token, id, "Resolved token from store");
        Ok(record.original_url)
    }
}
