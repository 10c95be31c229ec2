//! Tracing subscriber setup shared by the fetch commands.

use tracing_subscriber::EnvFilter;

use crate::error::{RegistryError, RegistryResult};

/// Pick the effective level: `verbose` raises anything quieter than debug.
pub fn effective_level(level: &str, verbose: bool) -> String {
    let level = level.to_lowercase();
    if verbose && matches!(level.as_str(), "info" | "warn" | "error") {
        "debug".to_string()
    } else {
        level
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str, json: bool) -> RegistryResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| RegistryError::invalid("log_level", e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| {
        RegistryError::InternalError(format!("Failed to install tracing subscriber: {}", e))
    })
}
