//! Cache implementations for the redirect path.

pub mod moka;
pub mod null;
pub mod redis;

pub use moka::MokaUrlCache;
pub use null::NullCache;
pub use redis::{RedisSettings, RedisUrlCache};
pub use shortlink_core::cache::{Result, UrlCache};
pub use shortlink_core::CacheError;
