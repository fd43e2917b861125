use async_trait::async_trait;
use shortlink_core::{ShortCode, UrlCache};
use std::time::Duration;

use crate::Result;

/// A cache that stores nothing.
///
/// Stands in when caching is disabled or the cache backend was unreachable
/// at startup; every lookup is a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

#[async_trait]
impl UrlCache for NullCache {
    async fn get_url(&self, _code: &ShortCode) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_url(&self, _code: &ShortCode, _original_url: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_misses() {
        let cache = NullCache;
        let code = ShortCode::new_unchecked("abc123");

        cache
            .set_url(&code, "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.get_url(&code).await.unwrap().is_none());
    }
}
