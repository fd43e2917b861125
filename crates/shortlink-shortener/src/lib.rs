//! URL shortener service implementation.
//!
//! Core types are re-exported from `shortlink_core`.

pub mod service;

pub use service::ShortenerService;
pub use shortlink_core::{CreatedUrl, ShortenParams, Shortener, ShortenerError};
