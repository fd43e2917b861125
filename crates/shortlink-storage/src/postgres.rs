use async_trait::async_trait;
use jiff::Timestamp;
use shortlink_core::repository::{ReadRepository, Repository, Result};
use shortlink_core::{NewUrl, ShortCode, Stats, StorageError, UrlRecord};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{debug, info, trace};
use typed_builder::TypedBuilder;

const SCHEMA: &str = include_str!("../ddl/postgres/urls.sql");

/// Pool limits for [`PostgresRepository::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct PoolSettings {
    #[builder(default = 10)]
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection, including connecting.
    #[builder(default = Duration::from_secs(5))]
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// PostgreSQL implementation of the repository contract.
///
/// Timestamps are stored as `BIGINT` microseconds since the Unix epoch and
/// decode straight into [`jiff::Timestamp`].
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new connection pool.
    ///
    /// The first connection is established eagerly, so an unreachable
    /// database fails here rather than on the first request.
    pub async fn connect(database_url: &str, settings: PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        info!(
            max_connections = settings.max_connections,
            "connected to postgres"
        );
        Ok(Self::new(pool))
    }

    /// Creates the `urls` table and its index if they do not exist.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("postgres schema ready");
        Ok(())
    }
}

fn now_micros() -> i64 {
    Timestamp::now().as_microsecond()
}

fn parse_micros(column: &str, micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{micros}': {e}"))
    })
}

fn decode_record(row: &PgRow) -> Result<UrlRecord> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let clicks: i64 = row.try_get("clicks").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let expires_at: Option<i64> = row.try_get("expires_at").map_err(map_sqlx_error)?;

    let clicks = u64::try_from(clicks)
        .map_err(|_| StorageError::InvalidData(format!("negative click count {clicks}")))?;

    Ok(UrlRecord {
        id,
        short_code: ShortCode::new_unchecked(short_code),
        original_url,
        clicks,
        created_at: parse_micros("created_at", created_at)?,
        expires_at: expires_at
            .map(|value| parse_micros("expires_at", value))
            .transpose()?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for PostgresRepository {
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlRecord> {
        trace!(code = %code, "fetching url record from postgres");

        let row = sqlx::query(
            r#"
            SELECT id, short_code, original_url, clicks, created_at, expires_at
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => decode_record(&row),
            None => Err(StorageError::NotFound(code.to_string())),
        }
    }

    async fn stats(&self) -> Result<Stats> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total_urls,
                   COALESCE(SUM(clicks), 0)::BIGINT AS total_clicks
            FROM urls
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let total_urls: i64 = row.try_get("total_urls").map_err(map_sqlx_error)?;
        let total_clicks: i64 = row.try_get("total_clicks").map_err(map_sqlx_error)?;

        Ok(Stats {
            total_urls: total_urls.max(0) as u64,
            total_clicks: total_clicks.max(0) as u64,
        })
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn insert(&self, url: NewUrl) -> Result<UrlRecord> {
        let expires_at = url.expires_at.map(|ts| ts.as_microsecond());

        let result = sqlx::query(
            r#"
            INSERT INTO urls (short_code, original_url, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, short_code, original_url, clicks, created_at, expires_at
            "#,
        )
        .bind(url.short_code.as_str())
        .bind(&url.original_url)
        .bind(now_micros())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                debug!(code = %url.short_code, "inserted url record");
                decode_record(&row)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(url.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_clicks(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query("UPDATE urls SET clicks = clicks + 1 WHERE short_code = $1")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
