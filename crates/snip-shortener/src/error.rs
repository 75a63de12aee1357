use snip_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidInput(String),
    #[error("url already exists at {short_url}")]
    AlreadyExists { short_url: String },
    /// Deliberately carries no detail: a token that fails to decode and one
    /// that decodes to a missing record must look the same.
    #[error("short url not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
