use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache serialization failed: {0}")]
    Serialization(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The store already holds a record for this original URL.
    #[error("original url already stored: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}
