use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use shortlink_gateway::config::{StorageBackendArg, DATABASE_URL_ENV};
use shortlink_gateway::{bootstrap, App, GatewayConfig};
use shortlink_storage::{InMemoryRepository, PoolSettings, PostgresRepository, Repository};
use tokio::signal;
use tracing::{error, info, warn};

/// How long to wait for queued clicks after the server stops.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = GatewayConfig::parse();
    shortlink_telemetry::init(config.log_format)?;

    info!(
        environment = %config.environment,
        listen_addr = %config.listen_addr(),
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting shortlink"
    );

    match config.storage {
        StorageBackendArg::InMemory => run(&config, Arc::new(InMemoryRepository::new())).await,
        StorageBackendArg::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .with_context(|| {
                    format!("{DATABASE_URL_ENV} is required when the storage backend is postgres")
                })?;
            let settings = PoolSettings::builder()
                .max_connections(config.database_max_connections)
                .acquire_timeout(config.database_acquire_timeout())
                .build();

            let repository = PostgresRepository::connect(database_url, settings)
                .await
                .context("failed to connect to database")?;
            repository
                .init_schema()
                .await
                .context("failed to initialise database schema")?;

            run(&config, Arc::new(repository)).await
        }
    }
}

async fn run<R: Repository>(config: &GatewayConfig, repository: Arc<R>) -> anyhow::Result<()> {
    let cache = bootstrap::connect_cache(config).await;
    let (state, click_worker) = bootstrap::build_state(config, repository, cache)?;

    let listen_addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(listen_addr = %listener.local_addr()?, "shortlink listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped, draining click queue");
    match tokio::time::timeout(CLICK_DRAIN_TIMEOUT, click_worker).await {
        Ok(Ok(())) => info!("click queue drained"),
        Ok(Err(e)) => warn!(error = %e, "click worker failed"),
        Err(_) => warn!("timed out waiting for click queue to drain"),
    }

    Ok(())
}

/// Completes on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
