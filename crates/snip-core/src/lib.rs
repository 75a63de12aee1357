//! Core types and traits for the snip URL shortener.
//!
//! This crate provides the record model and the seams shared by the
//! codec, cache, storage and shortener crates.

pub mod cache;
pub mod codec;
pub mod error;
pub mod record;
pub mod repository;
pub mod token;

pub use cache::{CacheKey, UrlCache};
pub use codec::IdCodec;
pub use error::{CacheError, StorageError};
pub use record::ShortenedUrl;
pub use repository::{ReadRepository, Repository};
pub use token::Token;
