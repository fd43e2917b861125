use std::sync::Arc;
use std::time::Duration;

use crate::click::ClickRecorder;
use crate::redirector::Redirector;
use async_trait::async_trait;
use shortlink_core::{ReadRepository, ShortCode, UrlCache};
use tracing::{debug, trace};

/// Service for handling URL redirects.
///
/// Reads through the cache to the repository and repopulates the cache on a
/// miss. Cache failures degrade to a miss. Each successful resolution queues
/// one click on the [`ClickRecorder`].
pub struct RedirectorService<R> {
    repository: Arc<R>,
    cache: Arc<dyn UrlCache>,
    cache_ttl: Duration,
    clicks: ClickRecorder,
}

impl<R> Clone for RedirectorService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            cache_ttl: self.cache_ttl,
            clicks: self.clicks.clone(),
        }
    }
}

impl<R: ReadRepository> RedirectorService<R> {
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn UrlCache>,
        cache_ttl: Duration,
        clicks: ClickRecorder,
    ) -> Self {
        Self {
            repository,
            cache,
            cache_ttl,
            clicks,
        }
    }

    async fn cached_url(&self, code: &ShortCode) -> Option<String> {
        match self.cache.get_url(code).await {
            Ok(url) => url,
            Err(e) => {
                debug!(code = %code, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }
}

#[async_trait]
impl<R: ReadRepository> Redirector for RedirectorService<R> {
    async fn resolve(&self, code: &ShortCode) -> crate::Result<String> {
        trace!(code = %code, "resolving short code");

        if let Some(url) = self.cached_url(code).await {
            self.clicks.record(code);
            return Ok(url);
        }

        let record = self.repository.get_by_code(code).await?;

        if let Err(e) = self
            .cache
            .set_url(code, &record.original_url, self.cache_ttl)
            .await
        {
            debug!(code = %code, error = %e, "failed to populate cache");
        }

        self.clicks.record(code);
        debug!(code = %code, url = %record.original_url, "resolved short code");
        Ok(record.original_url)
    }
}
