//! Tests for parameter-file loading.

use std::io::Write;

use registry_common::{load_yaml, ExportParams, ExportTarget, RegistryError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Section {
    collection_id: String,
    #[serde(flatten)]
    export: ExportParams,
    out_dir: String,
}

#[derive(Debug, Deserialize)]
struct Document {
    soilgrids: Section,
}

#[test]
fn test_load_yaml_with_flattened_export_params() {
    std::env::set_var("CONFIG_TESTS_BUCKET", "soil-exports");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
soilgrids:
  collection_id: projects/soilgrids-isric
  crs: EPSG:4326
  scale: 1000
  target: gcs
  bucket: ${{CONFIG_TESTS_BUCKET}}
  out_dir: data/raw/soilgrids
"#
    )
    .unwrap();

    let doc: Document = load_yaml(file.path()).unwrap();
    assert_eq!(doc.soilgrids.collection_id, "projects/soilgrids-isric");
    assert_eq!(doc.soilgrids.export.folder, "soil-exports");
    assert_eq!(doc.soilgrids.export.target, ExportTarget::Gcs);
    assert_eq!(doc.soilgrids.export.scale, 1000.0);
    assert_eq!(doc.soilgrids.out_dir, "data/raw/soilgrids");
}

#[test]
fn test_load_yaml_missing_file() {
    let result: Result<Document, _> = load_yaml(std::path::Path::new("/nonexistent/params.yaml"));
    assert!(matches!(result, Err(RegistryError::ReadError { .. })));
}

#[test]
fn test_load_yaml_parse_error_names_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "soilgrids: [not, a, mapping]").unwrap();

    let result: Result<Document, _> = load_yaml(file.path());
    match result {
        Err(RegistryError::ParseError { path, .. }) => {
            assert_eq!(path, file.path().display().to_string())
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}
