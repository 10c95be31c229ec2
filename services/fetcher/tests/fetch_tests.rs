//! End-to-end tests for the commands that need no Earth Engine access.

use std::path::Path;

use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use fetcher::context::Context;
use fetcher::datasets::{raw, try_pfts, vodca, worldclim};
use registry_common::Params;
use storage::{DownloadConfig, DownloadManager};
use tempfile::TempDir;
use test_utils::{write_zip, zip_bytes, MockServer};
use tokio_test::{assert_err, assert_ok};

fn context(yaml: &str, root: &Path) -> Context {
    Context::new(Params::from_yaml(yaml).unwrap(), root.to_path_buf())
}

fn manager() -> DownloadManager {
    DownloadManager::new(DownloadConfig {
        max_retries: 0,
        ..Default::default()
    })
    .unwrap()
}

fn static_file(body: Vec<u8>) -> axum::routing::MethodRouter {
    get(move || {
        let body = body.clone();
        async move { body }
    })
}

// ============================================================================
// WorldClim
// ============================================================================

#[tokio::test]
async fn test_worldclim_extracts_and_removes_zip() {
    let archive = zip_bytes(&[
        ("wc2.1_10m_bio_1.tif", b"bio1"),
        ("wc2.1_10m_bio_12.tif", b"bio12"),
    ]);
    let app = Router::new().route("/climate/wc2.1_10m_bio.zip", static_file(archive));
    let server = MockServer::start(app).await;

    let root = TempDir::new().unwrap();
    let yaml = format!(
        "worldclim:\n  url: {}\n  out_dir: data/raw/worldclim\n",
        server.url("/climate/wc2.1_10m_bio.zip")
    );
    let ctx = context(&yaml, root.path());

    assert_ok!(worldclim::run(&ctx).await);

    let out_dir = root.path().join("data/raw/worldclim");
    let extracted = out_dir.join("wc2-1_10m_bio");
    assert_eq!(std::fs::read(extracted.join("wc2.1_10m_bio_1.tif")).unwrap(), b"bio1");
    assert!(extracted.join("wc2.1_10m_bio_12.tif").exists());
    assert!(!out_dir.join("wc2-1_10m_bio.zip").exists());
}

#[tokio::test]
async fn test_worldclim_names_archive_after_redirect() {
    let archive = zip_bytes(&[("wc2.1_10m_bio_1.tif", b"bio1")]);
    let app = Router::new()
        .route("/climate/wc2.1_10m_bio.zip", static_file(archive))
        .route(
            "/latest",
            get(|| async { Redirect::temporary("/climate/wc2.1_10m_bio.zip") }),
        );
    let server = MockServer::start(app).await;

    let out_dir = TempDir::new().unwrap();
    let extracted = worldclim::fetch(&manager(), &server.url("/latest"), out_dir.path())
        .await
        .unwrap();

    assert_eq!(extracted, out_dir.path().join("wc2-1_10m_bio"));
    assert!(extracted.join("wc2.1_10m_bio_1.tif").exists());
    assert!(!out_dir.path().join("latest").exists());
}

#[tokio::test]
async fn test_worldclim_requires_section() {
    let root = TempDir::new().unwrap();
    let ctx = Context::new(Params::default(), root.path().to_path_buf());
    let err = worldclim::run(&ctx).await.unwrap_err();
    assert!(err.to_string().contains("worldclim"));
}

// ============================================================================
// Raw datasets
// ============================================================================

async fn raw_server() -> MockServer {
    let app = Router::new()
        .route("/files/biomes.gpkg", static_file(b"biomes".to_vec()))
        .route("/files/ecoregions.zip", static_file(b"ecoregions".to_vec()))
        .route("/files/gone.tif", get(|| async { StatusCode::NOT_FOUND }));
    MockServer::start(app).await
}

#[tokio::test]
async fn test_raw_downloads_selected_datasets() {
    let server = raw_server().await;
    let root = TempDir::new().unwrap();
    let yaml = format!(
        r#"
external_datasets:
  to_download: [biomes, ecoregions]
  max_concurrent: 2
  biomes:
    url: {}
    odir: data/raw/biomes
  ecoregions:
    url: {}
    odir: data/raw/ecoregions
  unused:
    url: {}
    odir: data/raw/unused
"#,
        server.url("/files/biomes.gpkg"),
        server.url("/files/ecoregions.zip"),
        server.url("/files/gone.tif"),
    );
    let ctx = context(&yaml, root.path());

    let mut saved = raw::fetch(&ctx, &manager()).await.unwrap();
    saved.sort();

    assert_eq!(
        saved,
        vec![
            root.path().join("data/raw/biomes/biomes.gpkg"),
            root.path().join("data/raw/ecoregions/ecoregions.zip"),
        ]
    );
    assert_eq!(std::fs::read(&saved[0]).unwrap(), b"biomes");
    assert!(!root.path().join("data/raw/unused").exists());
}

#[tokio::test]
async fn test_raw_reports_failed_downloads() {
    let server = raw_server().await;
    let root = TempDir::new().unwrap();
    let yaml = format!(
        r#"
external_datasets:
  to_download: [biomes, gone]
  biomes:
    url: {}
    odir: data/raw/biomes
  gone:
    url: {}
    odir: data/raw/gone
"#,
        server.url("/files/biomes.gpkg"),
        server.url("/files/gone.tif"),
    );
    let ctx = context(&yaml, root.path());

    let err = raw::fetch(&ctx, &manager()).await.unwrap_err();
    assert!(err.to_string().starts_with("1 of 2 downloads failed"));
    assert!(root.path().join("data/raw/biomes/biomes.gpkg").exists());
}

#[tokio::test]
async fn test_raw_unknown_dataset() {
    let root = TempDir::new().unwrap();
    let ctx = context("external_datasets:\n  to_download: [nope]\n", root.path());
    let err = raw::fetch(&ctx, &manager()).await.unwrap_err();
    assert!(err.to_string().contains("external_datasets.nope"));
}

// ============================================================================
// TRY plant functional types
// ============================================================================

const TRY_EXPORT: &[u8] = b"LastName\tAccSpeciesName\tTraitID\tOrigValueStr\n\
Kattge\tAbies alba\t42\ttree\n\
Kattge\tAbies alba\t42\tTree\n\
Kattge\tAbies alba\t42\tshrub\n\
Kattge\tPoa annua\t42\tgraminoid\n\
Kattge\tPoa annua\t42\tyes\n\
Kattge\tRubus idaeus\t42\therb_shrub\n\
Kattge\tRubus idaeus\t42\t2.5\n\
Kattge\tS\xe9seli montanum\t42\tforb\n";

fn read_output(path: &Path) -> Vec<(String, String)> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    assert_eq!(
        reader.headers().unwrap().iter().collect::<Vec<_>>(),
        vec!["AccSpeciesName", "pft"]
    );
    reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].to_string())
        })
        .collect()
}

#[tokio::test]
async fn test_try_pfts_from_archive() {
    let root = TempDir::new().unwrap();
    let archive = root.path().join("try/46442.zip");
    std::fs::create_dir_all(archive.parent().unwrap()).unwrap();
    write_zip(&archive, &[("46442.txt", TRY_EXPORT), ("README.pdf", b"%PDF")]);

    let ctx = context(
        "try_pfts:\n  input: try/46442.zip\n  output: data/try/try_pfts.csv\n",
        root.path(),
    );
    assert_ok!(try_pfts::run(&ctx, None, None).await);

    assert_eq!(
        read_output(&root.path().join("data/try/try_pfts.csv")),
        vec![
            ("abies alba".to_string(), "Tree".to_string()),
            ("poa annua".to_string(), "Grass".to_string()),
            ("rubus idaeus".to_string(), "Shrub".to_string()),
            ("séseli montanum".to_string(), "Grass".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_try_pfts_plain_file_with_cli_paths() {
    let root = TempDir::new().unwrap();
    let input = root.path().join("growth_forms.txt");
    std::fs::write(&input, TRY_EXPORT).unwrap();
    let output = root.path().join("out/pfts.csv");

    let ctx = Context::new(Params::default(), root.path().to_path_buf());
    try_pfts::run(&ctx, Some(input), Some(output.clone())).await.unwrap();

    assert_eq!(read_output(&output).len(), 4);
}

#[tokio::test]
async fn test_try_pfts_needs_input() {
    let root = TempDir::new().unwrap();
    let ctx = Context::new(Params::default(), root.path().to_path_buf());
    assert_err!(try_pfts::run(&ctx, None, None).await);
}

// ============================================================================
// VODCA tile merging
// ============================================================================

#[cfg(feature = "gdal")]
fn write_tile(path: &Path, origin_x: f64, value: f32) {
    use gdal::raster::Buffer;
    use gdal::spatial_ref::SpatialRef;
    use gdal::DriverManager;

    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut ds = driver.create_with_band_type::<f32, _>(path, 2, 2, 1).unwrap();
    ds.set_geo_transform(&[origin_x, 0.25, 0.0, 50.0, 0.0, -0.25]).unwrap();
    ds.set_spatial_ref(&SpatialRef::from_epsg(4326).unwrap()).unwrap();
    let mut band = ds.rasterband(1).unwrap();
    let mut buffer = Buffer::new((2, 2), vec![value; 4]);
    band.write((0, 0), (2, 2), &mut buffer).unwrap();
}

#[cfg(feature = "gdal")]
#[test]
fn test_vodca_tiles_merged() {
    let dir = TempDir::new().unwrap();
    write_tile(&dir.path().join("vodca_c-band-0000000000-0000000000.tif"), 0.0, 0.2);
    write_tile(&dir.path().join("vodca_c-band-0000000000-0000000002.tif"), 0.5, 0.4);

    assert_ok!(vodca::ensure_merge_supported());
    assert_ok!(vodca::merge_outputs(dir.path()));

    let merged = gdal::Dataset::open(dir.path().join("vodca_c-band.tif")).unwrap();
    assert_eq!(merged.raster_size(), (4, 2));
    assert!(!dir.path().join("vodca_c-band-0000000000-0000000000.tif").exists());
    assert!(!dir.path().join("vodca_c-band-0000000000-0000000002.tif").exists());
}
