use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use shortlink_core::repository::{ReadRepository, Repository, Result};
use shortlink_core::{NewUrl, ShortCode, Stats, StorageError, UrlRecord};
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory implementation of the repository contract using DashMap.
///
/// DashMap shards its locks, so concurrent inserts and click increments on
/// different codes do not contend.
#[derive(Debug)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlRecord>,
    next_id: AtomicI64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlRecord> {
        self.storage
            .get(code.as_str())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound(code.to_string()))
    }

    async fn stats(&self) -> Result<Stats> {
        let stats = self
            .storage
            .iter()
            .fold(Stats::default(), |acc, entry| Stats {
                total_urls: acc.total_urls + 1,
                total_clicks: acc.total_clicks + entry.clicks,
            });
        Ok(stats)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, url: NewUrl) -> Result<UrlRecord> {
        // The entry guard holds the shard lock, so check-and-insert is atomic.
        match self.storage.entry(url.short_code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(url.short_code.to_string())),
            Entry::Vacant(slot) => {
                let record = UrlRecord {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    short_code: url.short_code,
                    original_url: url.original_url,
                    clicks: 0,
                    created_at: Timestamp::now(),
                    expires_at: url.expires_at,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn increment_clicks(&self, code: &ShortCode) -> Result<bool> {
        match self.storage.get_mut(code.as_str()) {
            Some(mut entry) => {
                entry.clicks += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
