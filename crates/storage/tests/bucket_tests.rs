//! Tests for bucket validation against a mock Cloud Storage API.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use storage::{BucketAdmin, BucketStatus, StaticToken, StorageError};
use test_utils::MockServer;

#[derive(Clone, Default)]
struct Calls {
    created: Arc<Mutex<Vec<(HashMap<String, String>, Value)>>>,
}

fn app(existing: &'static [&'static str], create_status: StatusCode) -> (Router, Calls) {
    let calls = Calls::default();
    let router = Router::new()
        .route(
            "/storage/v1/b/:bucket",
            get(move |Path(bucket): Path<String>| async move {
                if bucket == "locked" {
                    StatusCode::FORBIDDEN
                } else if existing.contains(&bucket.as_str()) {
                    StatusCode::OK
                } else {
                    StatusCode::NOT_FOUND
                }
            }),
        )
        .route(
            "/storage/v1/b",
            post(
                move |State(calls): State<Calls>,
                      Query(query): Query<HashMap<String, String>>,
                      Json(body): Json<Value>| async move {
                    calls.created.lock().unwrap().push((query, body));
                    create_status
                },
            ),
        )
        .with_state(calls.clone());
    (router, calls)
}

fn admin(server: &MockServer) -> BucketAdmin {
    BucketAdmin::new("my-project", Arc::new(StaticToken::new("token")))
        .unwrap()
        .with_base_url(&server.base_url())
}

#[tokio::test]
async fn test_existing_bucket_is_left_alone() {
    let (router, calls) = app(&["gee_exports"], StatusCode::OK);
    let server = MockServer::start(router).await;

    let status = admin(&server).ensure_bucket("gee_exports").await.unwrap();

    assert_eq!(status, BucketStatus::Existing);
    assert!(calls.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_bucket_is_created_private() {
    let (router, calls) = app(&[], StatusCode::OK);
    let server = MockServer::start(router).await;

    let status = admin(&server)
        .with_location("us-central1")
        .ensure_bucket("new-bucket")
        .await
        .unwrap();

    assert_eq!(status, BucketStatus::Created);
    let created = calls.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let (query, body) = &created[0];
    assert_eq!(query["project"], "my-project");
    assert_eq!(query["predefinedAcl"], "private");
    assert_eq!(body["name"], "new-bucket");
    assert_eq!(body["location"], "us-central1");
}

#[tokio::test]
async fn test_forbidden_bucket() {
    let (router, _) = app(&[], StatusCode::OK);
    let server = MockServer::start(router).await;

    let err = admin(&server).ensure_bucket("locked").await.unwrap_err();
    assert!(matches!(err, StorageError::Forbidden(name) if name == "locked"));
}

#[tokio::test]
async fn test_name_taken_on_create() {
    let (router, _) = app(&[], StatusCode::CONFLICT);
    let server = MockServer::start(router).await;

    let err = admin(&server).ensure_bucket("taken").await.unwrap_err();
    assert!(matches!(err, StorageError::Forbidden(_)));
}
