//! Redirect path: cache-aside resolution of short codes plus background
//! click counting.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use shortlink_core::ShortCode;
//! use shortlink_redirector::{ClickRecorder, Redirector, RedirectorService};
//! # use shortlink_core::{Repository, UrlCache};
//!
//! # async fn example<R: Repository>(repo: Arc<R>, cache: Arc<dyn UrlCache>) -> shortlink_redirector::Result<()> {
//! let (clicks, _worker) = ClickRecorder::spawn(Arc::clone(&repo), 1024);
//! let service = RedirectorService::new(repo, cache, Duration::from_secs(86_400), clicks);
//!
//! let url = service.resolve(&ShortCode::new_unchecked("abc123")).await?;
//! println!("redirect to {url}");
//! # Ok(())
//! # }
//! ```

pub mod click;
pub mod error;
pub mod redirector;
pub mod service;

pub use click::ClickRecorder;
pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use service::RedirectorService;
