use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// Store-assigned identity.
    pub id: i64,
    pub short_code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
    /// Number of recorded redirects.
    pub clicks: u64,
    pub created_at: Timestamp,
    /// Advisory expiry. Nothing enforces it on read.
    pub expires_at: Option<Timestamp>,
}

/// Payload for inserting a new mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUrl {
    pub short_code: ShortCode,
    pub original_url: String,
    pub expires_at: Option<Timestamp>,
}

/// Aggregate counters over all stored records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_urls: u64,
    pub total_clicks: u64,
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the record for a short code.
    /// Returns `Err(NotFound)` if the code does not exist.
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlRecord>;

    /// Counts records and sums their clicks. An empty store yields zeros.
    async fn stats(&self) -> Result<Stats>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new URL record. Returns `Err(Conflict)` if the code already exists.
    async fn insert(&self, url: NewUrl) -> Result<UrlRecord>;

    /// Adds one click to the record for `code`.
    /// Returns `false` when no record matched.
    async fn increment_clicks(&self, code: &ShortCode) -> Result<bool>;
}
