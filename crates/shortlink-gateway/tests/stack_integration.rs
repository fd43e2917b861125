//! Full stack against real Postgres and Redis.
//!
//! Requires Docker: `cargo test -p shortlink-gateway -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use clap::Parser;
use serde_json::json;
use shortlink_gateway::model::{ShortenResponse, StatsResponse};
use shortlink_gateway::{bootstrap, App, GatewayConfig};
use shortlink_storage::{PoolSettings, PostgresRepository};
use shortlink_test_infra::postgres::{PostgresConfig, PostgresServer};
use shortlink_test_infra::redis::RedisServer;
use tower::ServiceExt;

async fn connect_postgres(url: &str) -> PostgresRepository {
    for _ in 0..20 {
        if let Ok(repo) = PostgresRepository::connect(url, PoolSettings::default()).await {
            return repo;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("postgres did not become reachable");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "requires docker"]
async fn shorten_redirect_and_count_with_postgres_and_redis() {
    let postgres = PostgresServer::new(PostgresConfig::builder().build())
        .await
        .expect("start postgres");
    let redis = RedisServer::with_password("stack-secret")
        .await
        .expect("start redis");
    let database_url = postgres.database_url().await.unwrap();
    let redis_address = redis.address().await.unwrap();

    let config = GatewayConfig::try_parse_from([
        "shortlink",
        "--environment",
        "integration",
        "--storage",
        "postgres",
        "--database-url",
        database_url.as_str(),
        "--cache",
        "redis",
        "--redis-url",
        redis_address.as_str(),
        "--redis-password",
        "stack-secret",
        "--redis-timeout-ms",
        "2000",
    ])
    .unwrap();

    let repository = connect_postgres(&database_url).await;
    repository.init_schema().await.unwrap();
    let repository = Arc::new(repository);

    let cache = bootstrap::connect_cache(&config).await;
    let (state, worker) = bootstrap::build_state(&config, Arc::clone(&repository), cache).unwrap();
    let router = App::router(state);

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/shorten")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"url": "https://example.com"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: ShortenResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(created.short_code.len(), 6);

    // Cold then warm cache.
    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(
                Request::get(format!("/{}", created.short_code))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.com"
        );
    }

    awaitility::at_most(Duration::from_secs(10))
        .poll_interval(Duration::from_millis(100))
        .until_async(|| async {
            let response = router
                .clone()
                .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
                .await
                .unwrap();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let stats: StatsResponse = serde_json::from_slice(&bytes).unwrap();
            stats
                == StatsResponse {
                    total_urls: 1,
                    total_clicks: 2,
                }
        })
        .await;

    drop(router);
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .unwrap()
        .unwrap();
}
