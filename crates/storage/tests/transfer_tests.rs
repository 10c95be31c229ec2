//! Tests for the resumable HTTP download manager against a local server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::Router;
use storage::{DownloadConfig, DownloadManager, StorageError};
use test_utils::MockServer;

const PAYLOAD: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn fast_config(max_retries: u32) -> DownloadConfig {
    DownloadConfig {
        max_retries,
        initial_retry_delay: Duration::from_millis(10),
        max_retry_delay: Duration::from_millis(20),
        ..Default::default()
    }
}

async fn ranged(headers: HeaderMap) -> impl IntoResponse {
    let start = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("bytes="))
        .and_then(|v| v.trim_end_matches('-').parse::<usize>().ok());

    match start {
        Some(start) if start < PAYLOAD.len() => (
            StatusCode::PARTIAL_CONTENT,
            [(header::ACCEPT_RANGES, "bytes")],
            PAYLOAD[start..].to_vec(),
        ),
        Some(_) => (
            StatusCode::RANGE_NOT_SATISFIABLE,
            [(header::ACCEPT_RANGES, "bytes")],
            Vec::new(),
        ),
        None => (StatusCode::OK, [(header::ACCEPT_RANGES, "bytes")], PAYLOAD.to_vec()),
    }
}

// ============================================================================
// Successful transfers
// ============================================================================

#[tokio::test]
async fn test_download_fresh_file() {
    let server = MockServer::start(Router::new().route("/data/wc2.1_30s_bio.zip", get(ranged))).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("wc2-1_30s_bio.zip");

    let manager = DownloadManager::new(fast_config(0)).unwrap();
    let path = manager
        .download(&server.url("/data/wc2.1_30s_bio.zip"), &dest)
        .await
        .unwrap();

    assert_eq!(path, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
    assert!(!dir.path().join("wc2-1_30s_bio.zip.partial").exists());
}

#[tokio::test]
async fn test_final_url_follows_redirects() {
    let app = Router::new()
        .route("/data/wc2.1_30s_bio.zip", get(ranged))
        .route("/latest", get(|| async { Redirect::temporary("/data/wc2.1_30s_bio.zip") }));
    let server = MockServer::start(app).await;
    let manager = DownloadManager::new(fast_config(0)).unwrap();

    assert_eq!(
        manager.final_url(&server.url("/latest")).await,
        server.url("/data/wc2.1_30s_bio.zip")
    );
    assert_eq!(
        manager.final_url(&server.url("/missing")).await,
        server.url("/missing")
    );
}

#[tokio::test]
async fn test_download_resumes_partial_file() {
    let server = MockServer::start(Router::new().route("/file.tif", get(ranged))).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("file.tif");
    std::fs::write(dir.path().join("file.tif.partial"), &PAYLOAD[..10]).unwrap();

    let manager = DownloadManager::new(fast_config(0)).unwrap();
    manager.download(&server.url("/file.tif"), &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
}

#[tokio::test]
async fn test_download_restarts_when_server_ignores_range() {
    let app = Router::new().route("/file.tif", get(|| async { PAYLOAD.to_vec() }));
    let server = MockServer::start(app).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("file.tif");
    std::fs::write(dir.path().join("file.tif.partial"), b"garbage").unwrap();

    let manager = DownloadManager::new(fast_config(0)).unwrap();
    manager.download(&server.url("/file.tif"), &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
}

#[tokio::test]
async fn test_download_many_reports_each_job() {
    let app = Router::new()
        .route("/a.tif", get(ranged))
        .route("/b.tif", get(ranged));
    let server = MockServer::start(app).await;
    let dir = tempfile::tempdir().unwrap();

    let jobs = vec![
        (server.url("/a.tif"), dir.path().join("a.tif")),
        (server.url("/b.tif"), dir.path().join("b.tif")),
        (server.url("/missing.tif"), dir.path().join("missing.tif")),
    ];

    let manager = DownloadManager::new(fast_config(0)).unwrap();
    let results = manager.download_many(jobs, 2).await;

    assert_eq!(results.len(), 3);
    let ok = results.iter().filter(|(_, r)| r.is_ok()).count();
    assert_eq!(ok, 2);
    assert!(dir.path().join("a.tif").exists());
    assert!(dir.path().join("b.tif").exists());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/gone.tif",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::NOT_FOUND
            }),
        )
        .with_state(hits.clone());
    let server = MockServer::start(app).await;
    let dir = tempfile::tempdir().unwrap();

    let manager = DownloadManager::new(fast_config(3)).unwrap();
    let err = manager
        .download(&server.url("/gone.tif"), &dir.path().join("gone.tif"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Status { status: 404, .. }));
    // one HEAD (routed to the GET handler) plus one GET
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let app = Router::new().route(
        "/flaky.tif",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let server = MockServer::start(app).await;
    let dir = tempfile::tempdir().unwrap();

    let manager = DownloadManager::new(fast_config(2)).unwrap();
    let err = manager
        .download(&server.url("/flaky.tif"), &dir.path().join("flaky.tif"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::RetriesExhausted { attempts: 3, .. }));
}
