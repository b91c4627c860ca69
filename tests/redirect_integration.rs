//! Router-level integration tests
//!
//! Drives the create and redirect routers with oneshot requests against
//! in-memory SQLite, and checks that the redirect path emits access
//! telemetry without blocking the response.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    Extension,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use slink::api::create_api_router;
use slink::config::{RuntimeEnv, TelemetryConfig};
use slink::redirect::create_redirect_router;
use slink::storage::{LinkStore, SqliteLinkStore};
use slink::telemetry::{AnalyticsSink, EventLogger, MemorySink};

async fn create_test_store() -> Arc<dyn LinkStore> {
    let store = SqliteLinkStore::new("sqlite::memory:", 5).await.unwrap();
    store.init().await.unwrap();
    Arc::new(store)
}

fn test_logger() -> (Arc<MemorySink>, Arc<EventLogger>) {
    let sink = Arc::new(MemorySink::new());
    let config = TelemetryConfig {
        environment: RuntimeEnv::Production,
        disable_bot_access_logs: false,
        trust_forwarded_for: false,
    };
    let logger = Arc::new(EventLogger::new(
        Arc::clone(&sink) as Arc<dyn AnalyticsSink>,
        config,
    ));
    (sink, logger)
}

fn peer() -> ConnectInfo<SocketAddr> {
    ConnectInfo("203.0.113.9:55555".parse().unwrap())
}

/// The write happens on a detached task; poll briefly instead of sleeping a
/// fixed amount.
async fn wait_for_points(sink: &MemorySink, expected: usize) {
    for _ in 0..100 {
        if sink.len().await >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} data points, got {}", sink.len().await);
}

#[tokio::test]
async fn test_redirect_found() {
    let store = create_test_store().await;
    store.create("docs", "https://example.com/docs").await.unwrap();
    let (_sink, logger) = test_logger();

    let router = create_redirect_router(store, logger).layer(Extension(peer()));
    let response = router
        .oneshot(Request::get("/docs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "https://example.com/docs"
    );
}

#[tokio::test]
async fn test_redirect_unknown_slug() {
    let store = create_test_store().await;
    let (_sink, logger) = test_logger();

    let router = create_redirect_router(store, logger).layer(Extension(peer()));
    let response = router
        .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redirect_emits_one_access_event() {
    let store = create_test_store().await;
    store.create("docs", "https://example.com/docs").await.unwrap();
    let (sink, logger) = test_logger();

    let router = create_redirect_router(store, logger).layer(Extension(peer()));
    let response = router
        .oneshot(
            Request::get("/docs")
                .header("user-agent", "curl/8.4.0")
                .header("cf-ipcountry", "US")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    wait_for_points(&sink, 1).await;
    let points = sink.points().await;
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].blobs[0], "docs"); // blob1 = slug
    assert_eq!(points[0].blobs[16], "access"); // blob17 = event_type
}

#[tokio::test]
async fn test_create_link_and_create_event() {
    let store = create_test_store().await;
    let (sink, logger) = test_logger();

    let router = create_api_router(Arc::clone(&store), logger).layer(Extension(peer()));
    let response = router
        .oneshot(
            Request::post("/api/links")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"url":"https://example.com/docs","slug":"docs"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(created["slug"], "docs");
    assert_eq!(created["target_url"], "https://example.com/docs");
    assert!(store.get("docs").await.unwrap().is_some());

    wait_for_points(&sink, 1).await;
    let points = sink.points().await;
    assert_eq!(points[0].blobs[16], "create");
}

#[tokio::test]
async fn test_create_conflict() {
    let store = create_test_store().await;
    store.create("docs", "https://example.com/a").await.unwrap();
    let (_sink, logger) = test_logger();

    let router = create_api_router(store, logger).layer(Extension(peer()));
    let response = router
        .oneshot(
            Request::post("/api/links")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"url":"https://example.com/b","slug":"docs"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(err["error"], "Slug already exists");
}

#[tokio::test]
async fn test_create_rejects_invalid_url() {
    let store = create_test_store().await;
    let (sink, logger) = test_logger();

    let router = create_api_router(store, logger).layer(Extension(peer()));
    let response = router
        .oneshot(
            Request::post("/api/links")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"url":"ftp://example.com/file"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(sink.is_empty().await);
}

// Bot suppression applies to the redirect path only: a bot may create links,
// but its visits are dropped when the flag is set.
#[tokio::test]
async fn test_redirect_suppresses_bot_with_flag() {
    let store = create_test_store().await;
    store.create("docs", "https://example.com/docs").await.unwrap();

    let sink = Arc::new(MemorySink::new());
    let config = TelemetryConfig {
        environment: RuntimeEnv::Production,
        disable_bot_access_logs: true,
        trust_forwarded_for: false,
    };
    let logger = Arc::new(EventLogger::new(
        Arc::clone(&sink) as Arc<dyn AnalyticsSink>,
        config,
    ));

    let router = create_redirect_router(store, logger).layer(Extension(peer()));
    let response = router
        .oneshot(
            Request::get("/docs")
                .header(
                    "user-agent",
                    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The redirect itself still happens; only the telemetry is dropped.
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sink.is_empty().await);
}
