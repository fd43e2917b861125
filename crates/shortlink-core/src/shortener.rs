use crate::error::ShortenerError;
use crate::repository::Stats;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// Optional caller-chosen code.
    pub custom_code: Option<ShortCode>,
    /// Optional advisory expiry.
    pub expires_at: Option<Timestamp>,
}

/// The outcome of a successful shorten call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedUrl {
    pub short_code: ShortCode,
    pub short_url: String,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns its code and public URL.
    async fn shorten(&self, params: ShortenParams) -> Result<CreatedUrl, ShortenerError>;

    /// Returns aggregate counters over all shortened URLs.
    async fn stats(&self) -> Result<Stats, ShortenerError>;
}
