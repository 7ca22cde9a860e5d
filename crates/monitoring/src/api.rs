//! REST client for the Grafana HTTP API.
//!
//! Wraps the handful of endpoints this service needs (datasources, folders,
//! dashboard save/search, health) using [`reqwest`]. Every request carries
//! the configured bearer token and a per-call timeout.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Timeout for list and create calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
/// Dashboard saves can carry large panel definitions.
const DASHBOARD_TIMEOUT: Duration = Duration::from_secs(20);
/// Health probes should fail fast.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client for a single Grafana instance.
#[derive(Clone)]
pub struct GrafanaApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for GrafanaApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrafanaApi")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Errors from the Grafana REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GrafanaApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Grafana returned a non-2xx status code.
    #[error("Grafana API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body is not what the endpoint documents.
    #[error("Malformed Grafana response: {0}")]
    MalformedResponse(String),
}

impl GrafanaApiError {
    /// Whether Grafana refused a create because the resource already exists.
    ///
    /// Grafana answers duplicates with 409 for folders and datasources, but
    /// some versions use other codes with an "already exists" message.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::ApiError { status, body } => {
                *status == 409 || body.to_lowercase().contains("already exists")
            }
            _ => false,
        }
    }
}

/// Result of a create call, split so callers can recover from conflicts
/// without inspecting error text themselves.
#[derive(Debug)]
pub enum CreateOutcome {
    /// The resource was created; holds the response body.
    Created(Value),
    /// The resource already exists; holds the create error so it can be
    /// re-raised if the fallback lookup finds nothing.
    Conflict(GrafanaApiError),
}

impl GrafanaApi {
    /// Create a new API client for a Grafana instance.
    ///
    /// * `base_url` - e.g. `http://host:3000`; a trailing slash is ignored.
    /// * `token` - service-account token; an empty token sends no auth header.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/datasources`.
    pub async fn create_datasource(&self, payload: &Value) -> Result<CreateOutcome, GrafanaApiError> {
        self.create("/api/datasources", payload).await
    }

    /// `GET /api/datasources`.
    pub async fn list_datasources(&self) -> Result<Vec<Value>, GrafanaApiError> {
        self.get_json("/api/datasources", DEFAULT_TIMEOUT).await
    }

    /// `POST /api/folders` with `{"title": title}`.
    pub async fn create_folder(&self, title: &str) -> Result<CreateOutcome, GrafanaApiError> {
        self.create("/api/folders", &serde_json::json!({ "title": title }))
            .await
    }

    /// `GET /api/folders`.
    pub async fn list_folders(&self) -> Result<Vec<Value>, GrafanaApiError> {
        self.get_json("/api/folders", DEFAULT_TIMEOUT).await
    }

    /// `POST /api/dashboards/db`. The body is the full save request
    /// (`dashboard`, `folderUid`, `overwrite`, `message`).
    pub async fn save_dashboard(&self, body: &Value) -> Result<Value, GrafanaApiError> {
        let response = self
            .request(Method::POST, "/api/dashboards/db", DASHBOARD_TIMEOUT)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /api/search?type=dash-db`.
    pub async fn search_dashboards(&self) -> Result<Vec<Value>, GrafanaApiError> {
        self.get_json("/api/search?type=dash-db", DEFAULT_TIMEOUT)
            .await
    }

    /// `GET /api/health`.
    pub async fn health(&self) -> Result<Value, GrafanaApiError> {
        self.get_json("/api/health", HEALTH_TIMEOUT).await
    }

    // ---- private helpers ----

    /// The single place the bearer header is attached.
    fn request(&self, method: Method, path: &str, timeout: Duration) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .timeout(timeout);

        if self.token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.token)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<T, GrafanaApiError> {
        let response = self.request(Method::GET, path, timeout).send().await?;
        Self::parse_response(response).await
    }

    async fn create(&self, path: &str, payload: &Value) -> Result<CreateOutcome, GrafanaApiError> {
        let response = self
            .request(Method::POST, path, DEFAULT_TIMEOUT)
            .json(payload)
            .send()
            .await?;

        match Self::parse_response(response).await {
            Ok(body) => Ok(CreateOutcome::Created(body)),
            Err(e) if e.is_conflict() => {
                tracing::debug!(path, error = %e, "Create reported an existing resource");
                Ok(CreateOutcome::Conflict(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GrafanaApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GrafanaApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GrafanaApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    ///
    /// Decoding failures are reported as [`GrafanaApiError::MalformedResponse`]
    /// rather than as transport errors.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GrafanaApiError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| GrafanaApiError::MalformedResponse(e.to_string()))
    }
}
