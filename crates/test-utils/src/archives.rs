//! Builders for zip archives used as download payloads.

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::ZipWriter;

/// Build an in-memory zip containing `entries` in the given order.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(data).expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

/// Write a zip containing `entries` to `path`.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    std::fs::write(path, zip_bytes(entries)).expect("Failed to write zip archive");
}
