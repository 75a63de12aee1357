//! The shortening engine: validates URLs, checks for duplicates, assigns
//! ids and maps tokens back to their original URLs.

pub mod config;
pub mod error;
pub mod service;
pub mod shortener;

pub use config::{BaseUrl, ShortenerConfig};
pub use error::{ConfigError, Result, ShortenerError};
pub use service::ShortenerService;
pub use shortener::Shortener;
