use crate::Result;
use async_trait::async_trait;
use shortlink_core::ShortCode;

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to the URL to redirect to, recording a click.
    ///
    /// Returns `Err(NotFound)` if the code does not exist.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;
}
