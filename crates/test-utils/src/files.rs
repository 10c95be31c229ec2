//! Scratch files for tests that work on directories of exports.

use std::fs;
use std::path::{Path, PathBuf};

/// Create an empty file `dir/name`, including missing parent directories.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, b"").expect("Failed to create test file");
    path
}

/// `touch` each of `names`.
pub fn touch_all(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|name| touch(dir, name)).collect()
}

/// Sorted names of the regular files directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to list directory")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_and_list() {
        let dir = tempfile::tempdir().unwrap();
        touch_all(dir.path(), &["b.tif", "a.tif", "nested/c.tif"]);

        assert_eq!(file_names(dir.path()), vec!["a.tif", "b.tif"]);
        assert!(dir.path().join("nested/c.tif").is_file());
    }
}
