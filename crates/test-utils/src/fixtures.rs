//! Canned API payloads for client tests.

use serde_json::{json, Value};

/// GBIF download keys look like this.
pub const GBIF_KEY: &str = "0000000-000000000000000";

/// Earth Engine project used across tests.
pub const EE_PROJECT: &str = "test-project";

/// GBIF occurrence download metadata in the given status
/// (`PREPARING`, `RUNNING`, `SUCCEEDED`, `FAILED`, `KILLED`, `CANCELLED`).
pub fn gbif_download_metadata(key: &str, status: &str) -> Value {
    json!({
        "key": key,
        "doi": "10.15468/dl.test00",
        "license": "http://creativecommons.org/licenses/by-nc/4.0/legalcode",
        "request": {
            "predicate": {
                "type": "and",
                "predicates": [
                    {"type": "equals", "key": "TAXON_KEY", "value": "7707728"},
                    {"type": "equals", "key": "OCCURRENCE_STATUS", "value": "present"}
                ]
            },
            "sendNotification": true,
            "format": "SIMPLE_PARQUET",
            "type": "OCCURRENCE"
        },
        "created": "2024-05-02T10:11:12.000+00:00",
        "modified": "2024-05-02T10:41:12.000+00:00",
        "eraseAfter": "2024-11-02T10:11:12.000+00:00",
        "status": status,
        "downloadLink": format!("https://api.gbif.org/v1/occurrence/download/request/{}.zip", key),
        "size": 1024,
        "totalRecords": 42,
        "numberDatasets": 3
    })
}

/// An Earth Engine export operation in `state`.
pub fn ee_operation(name: &str, description: &str, state: &str) -> Value {
    let done = matches!(state, "SUCCEEDED" | "FAILED" | "CANCELLED");
    let mut op = json!({
        "name": name,
        "metadata": {
            "@type": "type.googleapis.com/google.earthengine.v1.OperationMetadata",
            "state": state,
            "description": description,
            "createTime": "2024-05-02T10:11:12.000Z",
            "updateTime": "2024-05-02T10:12:12.000Z",
            "type": "EXPORT_IMAGE"
        },
        "done": done
    });

    if state == "FAILED" {
        op["error"] = json!({"code": 3, "message": "Export too large: specified 1e14 pixels"});
    }
    op
}

/// Operation resource name for an id in the test project.
pub fn ee_operation_name(id: &str) -> String {
    format!("projects/{}/operations/{}", EE_PROJECT, id)
}
