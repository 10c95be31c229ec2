//! GBIF client tests against a mock occurrence-download API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use gbif::{Credentials, DownloadStatus, GbifClient, GbifError};
use serde_json::{json, Value};
use storage::DownloadConfig;
use test_utils::fixtures::{gbif_download_metadata, GBIF_KEY};
use test_utils::{zip_bytes, MockServer};

#[derive(Default)]
struct MockGbif {
    /// Statuses returned by successive metadata requests; the last repeats.
    statuses: Vec<&'static str>,
    polls: usize,
    requests: Vec<(Option<String>, Value)>,
    zip_hits: usize,
}

type Shared = Arc<Mutex<MockGbif>>;

async fn request_download(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().requests.push((auth, body));
    (StatusCode::CREATED, GBIF_KEY)
}

async fn metadata(State(state): State<Shared>, Path(key): Path<String>) -> impl IntoResponse {
    let mut state = state.lock().unwrap();
    if key != GBIF_KEY {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})));
    }
    let index = state.polls.min(state.statuses.len().saturating_sub(1));
    state.polls += 1;
    let status = state.statuses.get(index).copied().unwrap_or("RUNNING");
    (StatusCode::OK, Json(gbif_download_metadata(&key, status)))
}

async fn archive(
    State(state): State<Shared>,
    method: Method,
    Path(file): Path<String>,
) -> impl IntoResponse {
    if file != format!("{}.zip", GBIF_KEY) {
        return (StatusCode::NOT_FOUND, Bytes::new());
    }
    if method == Method::GET {
        state.lock().unwrap().zip_hits += 1;
    }
    let data = zip_bytes(&[("occurrence.parquet/000000", b"parquet-part")]);
    (StatusCode::OK, Bytes::from(data))
}

async fn start(statuses: Vec<&'static str>) -> (MockServer, Shared, GbifClient) {
    let state: Shared = Arc::new(Mutex::new(MockGbif {
        statuses,
        ..Default::default()
    }));
    let app = Router::new()
        .route("/v1/occurrence/download/request", post(request_download))
        .route("/v1/occurrence/download/request/:file", get(archive))
        .route("/v1/occurrence/download/:key", get(metadata))
        .with_state(state.clone());
    let server = MockServer::start(app).await;

    let credentials = Credentials {
        user: "lusk".to_string(),
        password: "secret".to_string(),
        email: "lusk@example.org".to_string(),
    };
    let client = GbifClient::new(Some(credentials))
        .unwrap()
        .with_base_url(&server.url("/v1"))
        .with_download_config(DownloadConfig {
            max_retries: 0,
            ..Default::default()
        });
    (server, state, client)
}

const POLL: Duration = Duration::from_millis(5);

// ============================================================================
// Requesting downloads
// ============================================================================

#[tokio::test]
async fn test_init_download_posts_parquet_request() {
    let (_server, state, client) = start(vec!["PREPARING"]).await;
    let predicate = json!({"type": "equals", "key": "TAXON_KEY", "value": "7707728"});

    let key = client.init_download(&predicate).await.unwrap();
    assert_eq!(key, GBIF_KEY);

    let state = state.lock().unwrap();
    let (auth, body) = &state.requests[0];
    assert!(auth.as_deref().unwrap().starts_with("Basic "));
    assert_eq!(body["format"], "SIMPLE_PARQUET");
    assert_eq!(body["creator"], "lusk");
    assert_eq!(body["notificationAddresses"], json!(["lusk@example.org"]));
    assert_eq!(body["predicate"], predicate);
}

#[tokio::test]
async fn test_init_download_unwraps_predicate_member() {
    let (_server, state, client) = start(vec!["PREPARING"]).await;
    let predicate = json!({"type": "equals", "key": "COUNTRY", "value": "DE"});

    client
        .init_download(&json!({"predicate": predicate.clone()}))
        .await
        .unwrap();

    assert_eq!(state.lock().unwrap().requests[0].1["predicate"], predicate);
}

#[tokio::test]
async fn test_download_status() {
    let (_server, _state, client) = start(vec!["RUNNING"]).await;
    assert_eq!(client.download_status(GBIF_KEY).await.unwrap(), DownloadStatus::Running);

    let err = client.download_status("missing").await.unwrap_err();
    assert!(matches!(err, GbifError::Api { status: 404, .. }));
}

// ============================================================================
// Waiting and downloading
// ============================================================================

#[tokio::test]
async fn test_download_request_to_disk_named() {
    let (_server, _state, client) = start(vec!["SUCCEEDED"]).await;
    let dir = tempfile::tempdir().unwrap();

    let zip = client
        .download_request_to_disk(GBIF_KEY, dir.path(), Some("all_tracheophyta"))
        .await
        .unwrap();

    assert_eq!(zip, dir.path().join("all_tracheophyta.zip"));
    assert!(zip.exists());
    let meta: Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("all_tracheophyta.json")).unwrap()).unwrap();
    assert_eq!(meta["key"], GBIF_KEY);
    assert!(!dir.path().join(format!("{}.zip", GBIF_KEY)).exists());
}

#[tokio::test]
async fn test_wait_polls_until_succeeded() {
    let (_server, state, client) = start(vec!["PREPARING", "RUNNING", "SUCCEEDED"]).await;
    let dir = tempfile::tempdir().unwrap();

    let zip = client
        .wait_and_download(GBIF_KEY, dir.path(), None, Duration::from_secs(60), POLL)
        .await
        .unwrap();

    assert_eq!(zip, dir.path().join(format!("{}.zip", GBIF_KEY)));
    assert!(dir.path().join(format!("{}.json", GBIF_KEY)).exists());
    let state = state.lock().unwrap();
    assert_eq!(state.zip_hits, 1);
    // three status polls plus the metadata fetch for the JSON file
    assert_eq!(state.polls, 4);
}

#[tokio::test]
async fn test_wait_fails_on_failed_job() {
    let (_server, state, client) = start(vec!["RUNNING", "FAILED"]).await;
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .wait_and_download(GBIF_KEY, dir.path(), None, Duration::from_secs(60), POLL)
        .await
        .unwrap_err();

    match err {
        GbifError::DownloadFailed { key, status } => {
            assert_eq!(key, GBIF_KEY);
            assert_eq!(status, DownloadStatus::Failed);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(state.lock().unwrap().zip_hits, 0);
}

#[tokio::test]
async fn test_wait_fails_on_killed_job() {
    let (_server, _state, client) = start(vec!["KILLED"]).await;
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .wait_and_download(GBIF_KEY, dir.path(), None, Duration::from_secs(60), POLL)
        .await
        .unwrap_err();
    assert!(matches!(err, GbifError::DownloadFailed { status: DownloadStatus::Killed, .. }));
}

#[tokio::test]
async fn test_wait_times_out_and_keeps_output_dir() {
    let (_server, _state, client) = start(vec!["RUNNING"]).await;
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .wait_and_download(GBIF_KEY, dir.path(), None, Duration::from_millis(20), POLL)
        .await
        .unwrap_err();

    assert!(matches!(err, GbifError::Timeout { .. }));
    assert!(dir.path().exists());
}

#[tokio::test]
async fn test_download_then_unpack() {
    let (_server, _state, client) = start(vec!["SUCCEEDED"]).await;
    let dir = tempfile::tempdir().unwrap();

    let zip = client
        .wait_and_download(GBIF_KEY, dir.path(), Some("ephedra"), Duration::from_secs(60), POLL)
        .await
        .unwrap();
    let parquet = gbif::unzip_and_rename(&zip).unwrap();

    assert_eq!(parquet, dir.path().join("ephedra.parquet"));
    assert_eq!(std::fs::read(parquet.join("000000")).unwrap(), b"parquet-part");
    assert!(dir.path().join("ephedra.json").exists());
}
