use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use shortlink_core::{ShortCode, UrlCache};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::Result;

const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct CachedUrl {
    original_url: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-process cache implementation using Moka.
///
/// Suited to single-node deployments that run without Redis.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    /// Creates a cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "cache hit in moka");
                Ok(Some(entry.original_url))
            }
            None => {
                trace!(code = %code, "cache miss in moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        let entry = CachedUrl {
            original_url: original_url.to_owned(),
            ttl,
        };
        self.cache.insert(code.as_str().to_owned(), entry).await;
        trace!(code = %code, ttl_secs = ttl.as_secs(), "cached url in moka");
        Ok(())
    }
}
