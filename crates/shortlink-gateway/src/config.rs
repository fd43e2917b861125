use clap::{Parser, ValueEnum};
use shortlink_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";
pub const SERVER_HOST_ENV: &str = "SERVER_HOST";
pub const SERVER_PORT_ENV: &str = "SERVER_PORT";
pub const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DATABASE_MAX_CONNECTIONS_ENV: &str = "DATABASE_MAX_CONNECTIONS";
pub const DATABASE_ACQUIRE_TIMEOUT_ENV: &str = "DATABASE_ACQUIRE_TIMEOUT_SECS";
pub const CACHE_BACKEND_ENV: &str = "CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const REDIS_PASSWORD_ENV: &str = "REDIS_PASSWORD";
pub const REDIS_TIMEOUT_ENV: &str = "REDIS_TIMEOUT_MS";
pub const CACHE_TTL_ENV: &str = "CACHE_TTL_SECS";
pub const SHORT_URL_LENGTH_ENV: &str = "SHORT_URL_LENGTH";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const CLICK_QUEUE_CAPACITY_ENV: &str = "CLICK_QUEUE_CAPACITY";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_REDIS_URL: &str = "localhost:6379";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "postgres")]
    Postgres,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Postgres => write!(f, "postgres"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "redis")]
    Redis,
    #[value(name = "memory")]
    Memory,
    #[value(name = "none")]
    None,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Redis => write!(f, "redis"),
            CacheBackendArg::Memory => write!(f, "memory"),
            CacheBackendArg::None => write!(f, "none"),
        }
    }
}

/// Process configuration, read once at startup from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "shortlink", about = "URL shortening service")]
pub struct GatewayConfig {
    /// Tag reported by `/health`.
    #[arg(long, env = ENVIRONMENT_ENV, default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    #[arg(long, env = SERVER_HOST_ENV, default_value = DEFAULT_SERVER_HOST)]
    pub host: String,

    #[arg(long, env = SERVER_PORT_ENV, default_value_t = 8080)]
    pub port: u16,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Postgres
    )]
    pub storage: StorageBackendArg,

    /// Required when the storage backend is `postgres`.
    #[arg(long, env = DATABASE_URL_ENV, hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = DATABASE_MAX_CONNECTIONS_ENV, default_value_t = 10)]
    pub database_max_connections: u32,

    #[arg(long, env = DATABASE_ACQUIRE_TIMEOUT_ENV, default_value_t = 5)]
    pub database_acquire_timeout_secs: u64,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Redis
    )]
    pub cache: CacheBackendArg,

    /// `host:port` or a `redis://` URL.
    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    #[arg(long, env = REDIS_PASSWORD_ENV, hide_env_values = true)]
    pub redis_password: Option<String>,

    #[arg(long, env = REDIS_TIMEOUT_ENV, default_value_t = 500)]
    pub redis_timeout_ms: u64,

    #[arg(
        long,
        env = CACHE_TTL_ENV,
        default_value_t = 86_400,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub cache_ttl_secs: u64,

    #[arg(
        long,
        env = SHORT_URL_LENGTH_ENV,
        default_value_t = 6,
        value_parser = clap::value_parser!(u8).range(1..=32)
    )]
    pub short_url_length: u8,

    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = CLICK_QUEUE_CAPACITY_ENV, default_value_t = 1024)]
    pub click_queue_capacity: usize,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl GatewayConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.database_acquire_timeout_secs)
    }

    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Empty strings count as unset.
    pub fn redis_password(&self) -> Option<&str> {
        self.redis_password.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<GatewayConfig, clap::Error> {
        GatewayConfig::try_parse_from(std::iter::once("shortlink").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--environment",
            "production",
            "--port",
            "9090",
            "--storage",
            "in-memory",
            "--cache",
            "none",
            "--short-url-length",
            "8",
            "--base-url",
            "https://sho.rt",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.environment, "production");
        assert_eq!(config.port, 9090);
        assert_eq!(config.storage, StorageBackendArg::InMemory);
        assert_eq!(config.cache, CacheBackendArg::None);
        assert_eq!(config.short_url_length, 8);
        assert_eq!(config.base_url, "https://sho.rt");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_out_of_range_code_length() {
        assert!(parse(&["--short-url-length", "0"]).is_err());
        assert!(parse(&["--short-url-length", "33"]).is_err());
        assert!(parse(&["--short-url-length", "32"]).is_ok());
    }

    #[test]
    fn rejects_zero_cache_ttl() {
        assert!(parse(&["--cache-ttl-secs", "0"]).is_err());
    }

    #[test]
    fn rejects_unknown_backends() {
        assert!(parse(&["--storage", "mysql"]).is_err());
        assert!(parse(&["--cache", "memcached"]).is_err());
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(parse(&["--port", "http"]).is_err());
    }

    #[test]
    fn derived_durations() {
        let config = parse(&[
            "--redis-timeout-ms",
            "250",
            "--cache-ttl-secs",
            "60",
            "--database-acquire-timeout-secs",
            "3",
        ])
        .unwrap();

        assert_eq!(config.redis_timeout(), Duration::from_millis(250));
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.database_acquire_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn empty_redis_password_is_unset() {
        let config = parse(&["--redis-password", ""]).unwrap();
        assert_eq!(config.redis_password(), None);

        let config = parse(&["--redis-password", "hunter2"]).unwrap();
        assert_eq!(config.redis_password(), Some("hunter2"));
    }

    #[test]
    fn listen_addr_joins_host_and_port() {
        let config = parse(&["--host", "127.0.0.1", "--port", "3000"]).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn command_definition_is_valid() {
        use clap::CommandFactory;
        GatewayConfig::command().debug_assert();
    }
}
