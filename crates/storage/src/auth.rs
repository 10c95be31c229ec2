//! OAuth access tokens for Google APIs.
//!
//! Earth Engine and the Cloud Storage JSON API both take a bearer token. A
//! token either comes from the environment or is minted by the `gcloud` CLI
//! from application-default credentials.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Environment variables checked, in order, for a ready-made access token.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GOOGLE_OAUTH_ACCESS_TOKEN", "EARTHENGINE_TOKEN"];

/// Something that hands out bearer tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> StorageResult<String>;
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> StorageResult<String> {
        Ok(self.0.clone())
    }
}

/// Reads the token from the environment on every call.
#[derive(Debug, Clone, Default)]
pub struct EnvToken;

impl EnvToken {
    /// The first non-empty token variable, if any.
    pub fn lookup() -> Option<String> {
        TOKEN_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }
}

#[async_trait]
impl TokenSource for EnvToken {
    async fn access_token(&self) -> StorageResult<String> {
        Self::lookup().ok_or_else(|| {
            StorageError::Auth(format!("none of {} is set", TOKEN_ENV_VARS.join(", ")))
        })
    }
}

/// Mints tokens with `gcloud auth application-default print-access-token`
/// and reuses them until they are close to expiry.
pub struct GcloudToken {
    program: String,
    ttl: Duration,
    cached: Mutex<Option<(String, Instant)>>,
}

impl GcloudToken {
    pub fn new() -> Self {
        Self {
            program: "gcloud".to_string(),
            // Tokens live an hour; refresh a little early
            ttl: Duration::from_secs(50 * 60),
            cached: Mutex::new(None),
        }
    }
}

impl Default for GcloudToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenSource for GcloudToken {
    async fn access_token(&self) -> StorageResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some((token, minted)) = cached.as_ref() {
            if minted.elapsed() < self.ttl {
                return Ok(token.clone());
            }
        }

        debug!(program = %self.program, "Requesting access token");
        let output = Command::new(&self.program)
            .args(["auth", "application-default", "print-access-token"])
            .output()
            .await
            .map_err(|e| StorageError::Auth(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(StorageError::Auth(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(StorageError::Auth(format!("{} printed no token", self.program)));
        }

        *cached = Some((token.clone(), Instant::now()));
        Ok(token)
    }
}

/// Environment token when one is set, otherwise gcloud.
pub fn default_token_source() -> Arc<dyn TokenSource> {
    if EnvToken::lookup().is_some() {
        Arc::new(EnvToken)
    } else {
        Arc::new(GcloudToken::new())
    }
}
