use crate::error::StorageError;
use crate::record::ShortenedUrl;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of the durable store.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Looks a record up by its store-assigned id.
    async fn find_by_id(&self, id: u64) -> Result<Option<ShortenedUrl>>;

    /// Looks a record up by exact original URL.
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortenedUrl>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new record and returns it with its freshly assigned id.
    ///
    /// Returns `Err(StorageError::Conflict)` if the store already holds a
    /// record for `original_url`.
    async fn save(&self, original_url: &str) -> Result<ShortenedUrl>;
}

#[async_trait]
impl<T: ReadRepository + ?Sized> ReadRepository for Arc<T> {
    async fn find_by_id(&self, id: u64) -> Result<Option<ShortenedUrl>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortenedUrl>> {
        (**self).find_by_original_url(original_url).await
    }
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn save(&self, original_url: &str) -> Result<ShortenedUrl> {
        (**self).save(original_url).await
    }
}
