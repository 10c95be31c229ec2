//! Shared test utilities for the eo-registry workspace.
//!
//! - [`MockServer`]: an axum router on an ephemeral port standing in for
//!   the GBIF, Earth Engine or Cloud Storage APIs
//! - [`fixtures`]: canned API payloads
//! - zip archive builders and scratch-file helpers
//!
//! ```ignore
//! use test_utils::{fixtures, MockServer};
//!
//! let server = MockServer::start(Router::new().route("/v1/ping", get(|| async { "pong" }))).await;
//! let client = GbifClient::new(None)?.with_base_url(&server.url("/v1"));
//! ```

pub mod archives;
pub mod files;
pub mod fixtures;
pub mod mock;

pub use archives::*;
pub use files::*;
pub use mock::*;
