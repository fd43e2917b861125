//! HTTP surface of the Shortlink service.

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use config::GatewayConfig;
pub use state::AppState;
