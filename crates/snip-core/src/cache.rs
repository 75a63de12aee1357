use crate::error::CacheError;
use crate::record::ShortenedUrl;
use async_trait::async_trait;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// The two namespaces a [`ShortenedUrl`] is cached under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey<'a> {
    /// Looked up when shortening, to spot duplicates without a store round trip.
    OriginalUrl(&'a str),
    /// Looked up when resolving, to skip the store entirely.
    Token(&'a str),
}

impl CacheKey<'_> {
    pub fn namespace(&self) -> &'static str {
        match self {
            CacheKey::OriginalUrl(_) => "original",
            CacheKey::Token(_) => "token",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            CacheKey::OriginalUrl(value) | CacheKey::Token(value) => value,
        }
    }
}

impl Display for CacheKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace(), self.value())
    }
}

/// A volatile cache of [`ShortenedUrl`] records with per-entry expiration.
///
/// A miss is never an error. Callers are expected to treat errors the same
/// way as misses; the store stays the source of truth.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get a record from the cache.
    ///
    /// Returns `Ok(None)` if the key is absent or expired.
    async fn get(&self, key: &CacheKey<'_>) -> Result<Option<ShortenedUrl>>;

    /// Store a record under `key`, replacing any previous entry.
    ///
    /// The entry expires `ttl` after this call.
    async fn set(&self, key: &CacheKey<'_>, record: &ShortenedUrl, ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<T: UrlCache + ?Sized> UrlCache for Arc<T> {
    async fn get(&self, key: &CacheKey<'_>) -> Result<Option<ShortenedUrl>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &CacheKey<'_>, record: &ShortenedUrl, ttl: Duration) -> Result<()> {
        (**self).set(key, record, ttl).await
    }
}
