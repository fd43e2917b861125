use serde::{Deserialize, Serialize};
use shortlink_core::Stats;

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(default)]
    pub custom_code: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub short_code: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub total_urls: u64,
    pub total_clicks: u64,
}

impl From<Stats> for StatsResponse {
    fn from(stats: Stats) -> Self {
        Self {
            total_urls: stats.total_urls,
            total_clicks: stats.total_clicks,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
