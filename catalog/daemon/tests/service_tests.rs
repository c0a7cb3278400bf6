//! Integration tests for the catalog service
//!
//! Starts the real service on an ephemeral port and fetches from it with the
//! same [`HttpRepository`] the browsing sessions use.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use catalog_core::{FetchError, HttpRepository, ItemRepository};
use catalog_daemon::{seed_catalog, CatalogService};

const TEST_TIMEOUT: Duration = Duration::from_secs(3);

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

/// Serve an arbitrary router, for malformed-response cases
async fn spawn_raw(app: Router) -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind(loopback()).await.unwrap();
    let address = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        server.await.unwrap();
    });
    (format!("http://{address}/products"), shutdown_tx)
}

// =============================================================================
// Service lifecycle
// =============================================================================

#[tokio::test]
async fn test_products_round_trip_through_repository() {
    let handle = CatalogService::new(seed_catalog())
        .start(loopback())
        .await
        .unwrap();

    let repo = HttpRepository::new(handle.products_url(), TEST_TIMEOUT).unwrap();
    let items = repo.fetch().await.unwrap();

    assert_eq!(items, seed_catalog());
    handle.stop().await;
}

#[tokio::test]
async fn test_empty_catalog_is_valid() {
    let handle = CatalogService::new(Vec::new())
        .start(loopback())
        .await
        .unwrap();

    let repo = HttpRepository::new(handle.products_url(), TEST_TIMEOUT).unwrap();
    assert_eq!(repo.fetch().await.unwrap(), Vec::new());
    handle.stop().await;
}

#[tokio::test]
async fn test_stopped_service_is_unreachable() {
    let handle = CatalogService::new(seed_catalog())
        .start(loopback())
        .await
        .unwrap();
    let url = handle.products_url();
    handle.stop().await;

    let repo = HttpRepository::new(url, TEST_TIMEOUT).unwrap();
    let err = repo.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::ConnectionFailed(_)), "got {err:?}");
}

#[tokio::test]
async fn test_health_endpoint() {
    let handle = CatalogService::new(seed_catalog())
        .start(loopback())
        .await
        .unwrap();

    let body = http_get_body(&format!("http://{}/health", handle.local_addr())).await;
    assert_eq!(body, "ok");
    handle.stop().await;
}

async fn http_get_body(url: &str) -> String {
    // The repository only speaks the catalog format; use a bare TCP request here
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let authority = url.trim_start_matches("http://");
    let (host, path) = authority.split_once('/').unwrap();
    let mut stream = tokio::net::TcpStream::connect(host).await.unwrap();
    let request = format!("GET /{path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
        .split("\r\n\r\n")
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// Malformed sources
// =============================================================================

#[tokio::test]
async fn test_non_array_body_is_malformed() {
    let app = Router::new().route("/products", get(|| async { "{\"oops\": true}" }));
    let (url, _shutdown) = spawn_raw(app).await;

    let repo = HttpRepository::new(url, TEST_TIMEOUT).unwrap();
    let err = repo.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_error_status_is_malformed() {
    let app = Router::new().route(
        "/products",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let (url, _shutdown) = spawn_raw(app).await;

    let repo = HttpRepository::new(url, TEST_TIMEOUT).unwrap();
    let err = repo.fetch().await.unwrap_err();
    assert_eq!(
        err,
        FetchError::MalformedResponse("catalog returned 500 Internal Server Error".to_string())
    );
}

#[tokio::test]
async fn test_slow_source_hits_client_timeout() {
    let app = Router::new().route(
        "/products",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "[]"
        }),
    );
    let (url, _shutdown) = spawn_raw(app).await;

    let repo = HttpRepository::new(url, Duration::from_millis(100)).unwrap();
    let err = repo.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::ConnectionFailed(_)), "got {err:?}");
}
