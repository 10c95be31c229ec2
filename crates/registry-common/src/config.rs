//! Parameter-file loading and path resolution.
//!
//! Parameter files are YAML with environment variable substitution using
//! `${VAR}` and `${VAR:-default}` syntax. Relative output paths resolve
//! against `PROJECT_ROOT` when it is set, otherwise the working directory.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

/// Environment variable naming the directory relative paths resolve against.
pub const PROJECT_ROOT_VAR: &str = "PROJECT_ROOT";

/// Read a YAML file, expand environment variables and deserialize it.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> RegistryResult<T> {
    let content = std::fs::read_to_string(path).map_err(|e| RegistryError::ReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let expanded = expand_env_vars(&content)?;

    let value = serde_yaml::from_str(&expanded).map_err(|e| RegistryError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    debug!(path = %path.display(), "Loaded parameter file");
    Ok(value)
}

/// Expand environment variables in a string.
/// Supports ${VAR} and ${VAR:-default} syntax
pub fn expand_env_vars(content: &str) -> RegistryResult<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => {
                        return Err(RegistryError::EnvVar(format!(
                            "Unclosed variable substitution: ${{{}",
                            var_expr
                        )))
                    }
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> RegistryResult<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .map_err(|_| RegistryError::EnvVar(format!("Environment variable {} not set", expr)))
    }
}

/// The directory relative output paths are resolved against.
pub fn project_root() -> PathBuf {
    match std::env::var_os(PROJECT_ROOT_VAR) {
        Some(root) if !root.is_empty() => PathBuf::from(root),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Resolve a configured path against the project root. Absolute paths are
/// returned unchanged.
pub fn resolve_path(path: impl AsRef<Path>) -> PathBuf {
    resolve_path_in(&project_root(), path)
}

/// Resolve `path` against an explicit root.
pub fn resolve_path_in(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
