//! Tests for exported-blob downloads using an in-memory bucket.

use std::sync::Arc;

use bytes::Bytes;
use object_store::{memory::InMemory, path::Path, ObjectStore};
use storage::{download_blob_if_exists, download_bucket, BlobFetch, GcsStore};

async fn bucket_with(objects: &[(&str, &'static [u8])]) -> GcsStore {
    let memory = InMemory::new();
    for (name, data) in objects {
        memory
            .put(&Path::from(*name), Bytes::from_static(data).into())
            .await
            .unwrap();
    }
    GcsStore::with_store("gee_exports", Arc::new(memory))
}

// ============================================================================
// download_blob_if_exists
// ============================================================================

#[tokio::test]
async fn test_single_file_downloaded() {
    let store = bucket_with(&[("canopy_height.tif", b"remote")]).await;
    let dir = tempfile::tempdir().unwrap();

    let fetch = download_blob_if_exists(&store, "canopy_height", dir.path(), false)
        .await
        .unwrap();

    let expected = dir.path().join("canopy_height.tif");
    assert_eq!(fetch, BlobFetch::Downloaded(expected.clone()));
    assert_eq!(std::fs::read(expected).unwrap(), b"remote");
}

#[tokio::test]
async fn test_existing_local_file_skipped_without_overwrite() {
    let store = bucket_with(&[("canopy_height.tif", b"remote")]).await;
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("canopy_height.tif");
    std::fs::write(&local, b"local").unwrap();

    let fetch = download_blob_if_exists(&store, "canopy_height", dir.path(), false)
        .await
        .unwrap();

    assert_eq!(fetch, BlobFetch::Skipped(local.clone()));
    assert_eq!(std::fs::read(local).unwrap(), b"local");
}

#[tokio::test]
async fn test_existing_local_file_replaced_with_overwrite() {
    let store = bucket_with(&[("canopy_height.tif", b"remote")]).await;
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("canopy_height.tif");
    std::fs::write(&local, b"local").unwrap();

    let fetch = download_blob_if_exists(&store, "canopy_height", dir.path(), true)
        .await
        .unwrap();

    assert_eq!(fetch, BlobFetch::Downloaded(local.clone()));
    assert_eq!(std::fs::read(local).unwrap(), b"remote");
}

#[tokio::test]
async fn test_multipart_export_downloads_all_parts() {
    let store = bucket_with(&[
        ("bio1-0000000000-0000000000.tif", b"p1"),
        ("bio1-0000000000-0000023296.tif", b"p2"),
        ("bio10-0000000000-0000000000.tif", b"other"),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();

    let fetch = download_blob_if_exists(&store, "bio1", dir.path(), false)
        .await
        .unwrap();

    match fetch {
        BlobFetch::Multipart(paths) => {
            assert_eq!(paths.len(), 2);
            assert!(dir.path().join("bio1-0000000000-0000023296.tif").exists());
            assert!(!dir.path().join("bio10-0000000000-0000000000.tif").exists());
        }
        other => panic!("expected multipart, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_export_reports_not_found() {
    let store = bucket_with(&[("other.tif", b"x")]).await;
    let dir = tempfile::tempdir().unwrap();

    let fetch = download_blob_if_exists(&store, "canopy_height", dir.path(), false)
        .await
        .unwrap();

    assert_eq!(fetch, BlobFetch::NotFound);
}

// ============================================================================
// download_bucket
// ============================================================================

#[tokio::test]
async fn test_download_bucket_fetches_everything() {
    let store = bucket_with(&[("a.tif", b"a"), ("b.tif", b"b"), ("c.tif", b"c")]).await;
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("mirror");

    let count = download_bucket(&store, &out).await.unwrap();

    assert_eq!(count, 3);
    for name in ["a.tif", "b.tif", "c.tif"] {
        assert!(out.join(name).exists(), "{} missing", name);
    }
}
