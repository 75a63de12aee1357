//! [`UrlCache`](snip_core::UrlCache) implementations.

pub mod moka;
pub mod null;
pub mod redis;

pub use self::moka::MokaUrlCache;
pub use self::null::NullCache;
pub use self::redis::RedisUrlCache;
