use crate::Result;
use async_trait::async_trait;
use url::Url;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens `original_url` and returns the absolute short URL.
    async fn shorten(&self, original_url: &str) -> Result<Url>;

    /// Resolves a token to the original URL it was created for.
    async fn resolve(&self, token: &str) -> Result<String>;
}
