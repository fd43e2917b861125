//! Core types and traits for the Shortlink URL shortener.
//!
//! This crate provides the shared vocabulary used by the storage, cache,
//! shortener, redirector and gateway crates.

pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, ShortenerError, StorageError};
pub use repository::{NewUrl, ReadRepository, Repository, Stats, UrlRecord};
pub use shortcode::ShortCode;
pub use shortener::{CreatedUrl, ShortenParams, Shortener};
