//! HTTP client for the Earth Engine REST API.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use storage::{default_token_source, BucketAdmin, TokenSource};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{EeError, EeResult};
use crate::export::ExportImageRequest;
use crate::expr::{Expression, Value};
use crate::image::{Image, ImageCollection};

/// Default API endpoint.
pub const STANDARD_URL: &str = "https://earthengine.googleapis.com/";

/// Endpoint for high request rates.
pub const HIGH_VOLUME_URL: &str = "https://earthengine-highvolume.googleapis.com/";

const API_VERSION: &str = "v1";
const MAX_RETRIES: u32 = 5;

/// A long-running operation, as returned for export jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub metadata: OperationMetadata,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListOperationsResponse {
    #[serde(default)]
    operations: Vec<Operation>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ComputeValueResponse {
    #[serde(default)]
    result: Json,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Client bound to one Cloud project.
pub struct EarthEngineClient {
    http: Client,
    base_url: String,
    project: String,
    tokens: Arc<dyn TokenSource>,
    storage_url: Option<String>,
    bucket_location: Option<String>,
    retry_delay: Duration,
}

impl EarthEngineClient {
    pub fn new(project: &str, base_url: &str, tokens: Arc<dyn TokenSource>) -> EeResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EeError::Http(format!("Failed to create HTTP client: {}", e)))?;

        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            project: project.to_string(),
            tokens,
            storage_url: None,
            bucket_location: None,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Use a different Cloud Storage API root for bucket checks.
    pub fn with_storage_url(mut self, url: &str) -> Self {
        self.storage_url = Some(url.to_string());
        self
    }

    /// Create missing export buckets in `location`.
    pub fn with_bucket_location(mut self, location: &str) -> Self {
        self.bucket_location = Some(location.to_string());
        self
    }

    /// Initial delay between retries of throttled requests.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bucket validation sharing this client's project and credentials.
    pub fn bucket_admin(&self) -> EeResult<BucketAdmin> {
        let mut admin = BucketAdmin::new(&self.project, self.tokens.clone())?;
        if let Some(url) = &self.storage_url {
            admin = admin.with_base_url(url);
        }
        if let Some(location) = &self.bucket_location {
            admin = admin.with_location(location);
        }
        Ok(admin)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, API_VERSION, path.trim_start_matches('/'))
    }

    fn project_path(&self, suffix: &str) -> String {
        format!("projects/{}/{}", self.project, suffix)
    }

    /// Evaluate an expression and return its JSON value.
    #[instrument(skip(self, value), fields(project = %self.project))]
    pub async fn compute_value(&self, value: &Value) -> EeResult<Json> {
        let body = json!({ "expression": Expression::encode(value) });
        let url = self.url(&self.project_path("value:compute"));
        let response: ComputeValueResponse = self
            .send_json(|| self.http.post(&url).json(&body))
            .await?;
        Ok(response.result)
    }

    pub async fn band_names(&self, image: &Image) -> EeResult<Vec<String>> {
        let result = self.compute_value(&image.band_names()).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn collection_size(&self, ic: &ImageCollection) -> EeResult<usize> {
        let result = self.compute_value(&ic.size()).await?;
        result
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| EeError::UnexpectedResponse(format!("collection size {}", result)))
    }

    /// CRS and affine transform of an image's default projection.
    pub async fn crs_and_transform(&self, image: &Image) -> EeResult<(String, Vec<f64>)> {
        let query = Value::Dictionary(BTreeMap::from([
            ("crs".to_string(), image.projection_crs()),
            ("transform".to_string(), image.projection_transform()),
        ]));
        let result = self.compute_value(&query).await?;

        let crs = result["crs"]
            .as_str()
            .ok_or_else(|| EeError::UnexpectedResponse(format!("projection {}", result)))?
            .to_string();
        let transform = serde_json::from_value(result["transform"].clone())?;
        Ok((crs, transform))
    }

    /// Submit an image export.
    #[instrument(skip(self, request), fields(description = %request.description))]
    pub async fn start_export(&self, request: &ExportImageRequest) -> EeResult<Operation> {
        let url = self.url(&self.project_path("image:export"));
        self.send_json(|| self.http.post(&url).json(request)).await
    }

    /// Fetch an operation by its full resource name.
    pub async fn get_operation(&self, name: &str) -> EeResult<Operation> {
        let url = self.url(name);
        self.send_json(|| self.http.get(&url)).await
    }

    /// Every operation of the project, newest first as the API returns them.
    pub async fn list_operations(&self) -> EeResult<Vec<Operation>> {
        let url = self.url(&self.project_path("operations"));
        let mut operations = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = page_token.clone();
            let page: ListOperationsResponse = self
                .send_json(|| {
                    let request = self.http.get(&url).query(&[("pageSize", "500")]);
                    match &token {
                        Some(t) => request.query(&[("pageToken", t.as_str())]),
                        None => request,
                    }
                })
                .await?;

            operations.extend(page.operations);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(count = operations.len(), "Listed operations");
        Ok(operations)
    }

    /// Authorize, send, retry throttling and server errors, decode JSON.
    async fn send_json<T, F>(&self, build: F) -> EeResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut delay = self.retry_delay;
        let mut attempt = 0;

        loop {
            let token = self.tokens.access_token().await?;
            let response = build()
                .bearer_auth(token)
                .header("x-goog-user-project", &self.project)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response.json().await?);
            }

            let retryable =
                status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < MAX_RETRIES {
                attempt += 1;
                warn!(
                    status = status.as_u16(),
                    retry = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Earth Engine request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            return Err(api_error(response).await);
        }
    }
}

async fn api_error(response: Response) -> EeError {
    let code = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => EeError::Api {
            code,
            status: body.error.status,
            message: body.error.message,
        },
        Err(_) => EeError::Api {
            code,
            status: String::new(),
            message: text,
        },
    }
}

/// Connect to Earth Engine for `project_id` with the default credentials.
///
/// Fetches a token up front so missing credentials fail here rather than
/// on the first request.
pub async fn ee_init(project_id: &str, high_volume: bool) -> EeResult<EarthEngineClient> {
    info!("Initializing Earth Engine...");
    let base_url = if high_volume { HIGH_VOLUME_URL } else { STANDARD_URL };
    let tokens = default_token_source();

    if let Err(e) = tokens.access_token().await {
        error!(error = %e, "Error initializing Earth Engine");
        return Err(e.into());
    }

    let client = EarthEngineClient::new(project_id, base_url, tokens)?;
    info!(project = %project_id, endpoint = %base_url, "Earth Engine initialized");
    Ok(client)
}
