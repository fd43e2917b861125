//! Wiring from [`GatewayConfig`] to a ready [`AppState`].

use std::sync::Arc;

use shortlink_cache::redis::DEFAULT_KEY_PREFIX;
use shortlink_cache::{MokaUrlCache, NullCache, RedisSettings, RedisUrlCache, UrlCache};
use shortlink_core::Repository;
use shortlink_generator::{GeneratorError, RandomGenerator};
use shortlink_redirector::{ClickRecorder, RedirectorService};
use shortlink_shortener::ShortenerService;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{CacheBackendArg, GatewayConfig};
use crate::state::AppState;

/// Builds the configured cache.
///
/// An unreachable Redis is not fatal: the service runs uncached.
pub async fn connect_cache(config: &GatewayConfig) -> Arc<dyn UrlCache> {
    match config.cache {
        CacheBackendArg::None => {
            info!("url cache disabled");
            Arc::new(NullCache)
        }
        CacheBackendArg::Memory => {
            info!("using in-process url cache");
            Arc::new(MokaUrlCache::new())
        }
        CacheBackendArg::Redis => {
            let settings = RedisSettings {
                address: config.redis_url.clone(),
                password: config.redis_password().map(str::to_owned),
                timeout: config.redis_timeout(),
                key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            };
            match RedisUrlCache::connect(settings).await {
                Ok(cache) => Arc::new(cache),
                Err(e) => {
                    warn!(
                        address = %config.redis_url,
                        error = %e,
                        "Redis unavailable, continuing without cache"
                    );
                    Arc::new(NullCache)
                }
            }
        }
    }
}

/// Assembles the services and starts the click worker.
///
/// The returned handle completes once every clone of the state is dropped
/// and queued clicks are flushed.
pub fn build_state<R: Repository>(
    config: &GatewayConfig,
    repository: Arc<R>,
    cache: Arc<dyn UrlCache>,
) -> Result<(AppState, JoinHandle<()>), GeneratorError> {
    let generator = RandomGenerator::new(usize::from(config.short_url_length))?;
    let shortener = ShortenerService::new(Arc::clone(&repository), generator, config.base_url.clone());

    let (clicks, click_worker) =
        ClickRecorder::spawn(Arc::clone(&repository), config.click_queue_capacity);
    let redirector = RedirectorService::new(repository, cache, config.cache_ttl(), clicks);

    let state = AppState::new(
        config.environment.clone(),
        Arc::new(shortener),
        Arc::new(redirector),
    );
    Ok((state, click_worker))
}
