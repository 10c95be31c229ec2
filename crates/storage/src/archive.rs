//! Zip archive extraction.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{StorageError, StorageResult};

/// Names of the entries in `archive`, in index order.
pub fn entry_names(archive: &Path) -> StorageResult<Vec<String>> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    let mut names = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        names.push(zip.by_index_raw(i)?.name().to_string());
    }
    Ok(names)
}

/// Read one member of `archive` into memory.
pub fn read_entry(archive: &Path, name: &str) -> StorageResult<Vec<u8>> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    let mut entry = match zip.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(StorageError::NotFound(format!("{}:{}", archive.display(), name)))
        }
        Err(e) => return Err(e.into()),
    };

    let mut data = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut data)
        .map_err(|e| StorageError::Archive(format!("{}: {}", name, e)))?;
    Ok(data)
}

/// Extract every entry of `archive` into `dest`, returning the files written.
///
/// Entries whose paths would land outside `dest` are skipped.
pub fn extract_zip(archive: &Path, dest: &Path) -> StorageResult<Vec<PathBuf>> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    fs::create_dir_all(dest)?;

    let mut written = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!(entry = %entry.name(), "Skipping archive entry with unsafe path");
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| StorageError::Archive(format!("{}: {}", entry.name(), e)))?;

        debug!(path = %out_path.display(), "Extracted");
        written.push(out_path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::write_zip;

    #[test]
    fn test_entry_names_in_archive_order() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("zeta.txt", b"z"), ("alpha.txt", b"a")]);

        assert_eq!(entry_names(&archive).unwrap(), vec!["zeta.txt", "alpha.txt"]);
    }

    #[test]
    fn test_extract_nested() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("occurrence.parquet/000000", b"pq"), ("meta.xml", b"<x/>")]);

        let out = dir.path().join("out");
        let files = extract_zip(&archive, &out).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(fs::read(out.join("occurrence.parquet/000000")).unwrap(), b"pq");
        assert_eq!(fs::read(out.join("meta.xml")).unwrap(), b"<x/>");
    }

    #[test]
    fn test_extract_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../escape.txt", b"x"), ("ok.txt", b"y")]);

        let out = dir.path().join("out");
        let files = extract_zip(&archive, &out).unwrap();

        assert_eq!(files, vec![out.join("ok.txt")]);
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn test_read_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("TRY_Life_Forms.zip");
        write_zip(&archive, &[("TRY_Life_Forms/19233.txt", b"AccSpeciesName\tOrigValueStr\n")]);

        let data = read_entry(&archive, "TRY_Life_Forms/19233.txt").unwrap();
        assert!(data.starts_with(b"AccSpeciesName"));
        assert!(matches!(
            read_entry(&archive, "missing.txt"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.zip");
        fs::write(&bogus, b"not a zip").unwrap();

        assert!(matches!(entry_names(&bogus), Err(StorageError::Archive(_))));
    }
}
