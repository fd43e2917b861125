use async_trait::async_trait;
use redis::AsyncCommands;
use shortlink_core::{CacheError, ShortCode, UrlCache};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, trace};
use typed_builder::TypedBuilder;

use crate::Result;

pub const DEFAULT_KEY_PREFIX: &str = "sl:url:";

/// Connection settings for [`RedisUrlCache`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisSettings {
    /// `host:port`, or a full `redis://` URL.
    #[builder(setter(into))]
    pub address: String,
    #[builder(default, setter(into, strip_option))]
    pub password: Option<String>,
    /// Upper bound for connecting and for every individual command.
    #[builder(default = Duration::from_millis(500))]
    pub timeout: Duration,
    #[builder(default = DEFAULT_KEY_PREFIX.to_string(), setter(into))]
    pub key_prefix: String,
}

/// A Redis-based implementation of [`UrlCache`].
///
/// Stores the original URL as a plain string under `{key_prefix}{code}`
/// with a per-key expiry.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
    timeout: Duration,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    let lower = message.to_ascii_lowercase();
    if lower.contains("connection refused") || lower.contains("broken pipe") {
        CacheError::Unavailable(message)
    } else if lower.contains("timed out") {
        CacheError::Timeout(message)
    } else {
        CacheError::Operation(message)
    }
}

/// Builds a `redis://` URL from an address and optional password.
fn connection_url(address: &str, password: Option<&str>) -> String {
    let (scheme, rest) = address.split_once("://").unwrap_or(("redis", address));
    match password.filter(|p| !p.is_empty()) {
        Some(password) if !rest.contains('@') => {
            format!("{scheme}://:{}@{rest}", urlencoding::encode(password))
        }
        _ => format!("{scheme}://{rest}"),
    }
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache with a custom key prefix.
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        timeout: Duration,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            timeout,
        }
    }

    /// Connects and verifies the server answers `PING`.
    pub async fn connect(settings: RedisSettings) -> Result<Self> {
        let url = connection_url(&settings.address, settings.password.as_deref());
        let client = redis::Client::open(url.as_str())
            .map_err(|e| map_redis_error("invalid Redis address", e))?;

        let timeout = settings.timeout;
        let conn = with_timeout(timeout, "connect to Redis", async {
            let mut conn = client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map_err(|e| map_redis_error("Redis PING failed", e))?;
            Ok(conn)
        })
        .await?;

        info!(address = %settings.address, "connected to Redis");
        Ok(Self::with_prefix(conn, timeout, settings.key_prefix))
    }

    fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(CacheError::Timeout(format!(
            "{operation}: timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        let key = self.cache_key(code);
        trace!(code = %code, "fetching url from Redis cache");

        let mut conn = self.conn.clone();
        let result = with_timeout(self.timeout, "Redis GET", async {
            conn.get::<_, Option<String>>(&key)
                .await
                .map_err(|e| map_redis_error("failed to fetch value from Redis", e))
        })
        .await;

        match result {
            Ok(Some(url)) => {
                debug!(code = %code, "cache hit in Redis");
                Ok(Some(url))
            }
            Ok(None) => {
                trace!(code = %code, "cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                debug!(code = %code, error = %e, "Redis error on get");
                Err(e)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, original_url: &str, ttl: Duration) -> Result<()> {
        let key = self.cache_key(code);
        // SET EX rejects zero.
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.conn.clone();
        let result = with_timeout(self.timeout, "Redis SET", async {
            conn.set_ex::<_, _, ()>(&key, original_url, seconds)
                .await
                .map_err(|e| map_redis_error("failed to write value to Redis", e))
        })
        .await;

        match result {
            Ok(()) => {
                debug!(code = %code, ttl_secs = seconds, "cached url in Redis");
                Ok(())
            }
            Err(e) => {
                debug!(code = %code, error = %e, "failed to cache url in Redis");
                Err(e)
            }
        }
    }
}
