use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A best-effort cache from short code to original URL.
///
/// The cache is never the source of truth. Implementations can use Redis,
/// in-memory caches, or nothing at all.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the original URL for `code`.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store the original URL for `code`, expiring after `ttl`.
    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()>;
}
