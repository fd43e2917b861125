use std::sync::Arc;

use shortlink_core::Shortener;
use shortlink_redirector::Redirector;

#[derive(Clone)]
pub struct AppState {
    environment: Arc<str>,
    shortener: Arc<dyn Shortener>,
    redirector: Arc<dyn Redirector>,
}

impl AppState {
    pub fn new(
        environment: impl Into<String>,
        shortener: Arc<dyn Shortener>,
        redirector: Arc<dyn Redirector>,
    ) -> Self {
        Self {
            environment: Arc::from(environment.into()),
            shortener,
            redirector,
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn redirector(&self) -> &dyn Redirector {
        self.redirector.as_ref()
    }
}
