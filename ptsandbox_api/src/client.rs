//! HTTP client for the PT Sandbox scan API.

use std::path::Path;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::{
    config::ClientConfig,
    errors::ApiError,
    tls,
    types::{CreateScanTaskRequest, RequestBody, RequestEnvelope, ScanIdRequest},
    Error,
};

/// Path prefix of every endpoint.
const API_ROOT: &str = "/api/v1";

const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client for the PT Sandbox scan API.
///
/// Every operation is a single `POST` that is awaited to completion. The
/// client keeps no state between calls: scan ids returned by
/// [`create_scan_task`](Client::create_scan_task) must be kept by the caller.
/// There is no retry or polling here; callers that want either loop outside.
pub struct Client {
    config: ClientConfig,
    /// `https://{host}/api/v1`, or `{base_url}/api/v1` for a custom base.
    root_url: String,
    /// `x-api-key` and `accept`, cloned into each request.
    headers: HeaderMap,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client for `https://{config.host}/api/v1`.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = format!("https://{}", config.host);
        Self::with_base_url(&base_url, config)
    }

    /// Creates a client with a custom base URL (scheme and authority). Used for
    /// testing with wiremock.
    pub fn with_base_url(base_url: &str, config: ClientConfig) -> Result<Self, Error> {
        let headers = default_headers(&config.api_key)?;

        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(!config.verify_tls);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::ClientBuild(e)
        })?;

        if !config.verify_tls {
            tls::suppress_insecure_warnings();
        }

        Ok(Self {
            root_url: format!("{}{}", base_url.trim_end_matches('/'), API_ROOT),
            config,
            headers,
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Headers attached to every request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Full URL for an endpoint path such as `/maintenance/checkHealth`.
    pub fn endpoint_url(&self, relative_path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", self.root_url, relative_path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(format!("{}{}: {}", self.root_url, relative_path, e))
        })
    }

    /// Sends one request and returns the parsed JSON reply.
    ///
    /// Non-success statuses become [`Error::Api`] carrying the full response
    /// text; a 2xx reply that is not valid JSON becomes [`Error::Decode`].
    pub async fn send_request(&self, envelope: RequestEnvelope) -> Result<Value, Error> {
        let url = self.endpoint_url(&envelope.relative_path)?;
        tracing::debug!("POST {}", url);

        let request = self.http.post(url).headers(envelope.headers);
        let request = match envelope.body {
            RequestBody::Empty => request,
            RequestBody::Json(json) => request.json(&json),
            RequestBody::Raw(bytes) => request.body(bytes),
        };

        let resp = request.send().await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", envelope.relative_path, e);
            Error::Transport(e)
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Transport(e)
        })?;

        if !status.is_success() {
            let err = ApiError::new(status.as_u16(), body);
            tracing::error!(
                "{} failed with status {} ({}): {}",
                envelope.relative_path,
                err.status_code,
                err.kind,
                truncate_body(&err.message)
            );
            return Err(err.into());
        }

        serde_json::from_str::<Value>(&body).map_err(|e| {
            tracing::error!(
                "Failed to parse response: {} | body: {}",
                e,
                truncate_body(&body)
            );
            Error::Decode(e)
        })
    }

    /// Probes the appliance's health endpoint.
    pub async fn check_health(&self) -> Result<Value, Error> {
        self.send_request(RequestEnvelope::new(
            "/maintenance/checkHealth",
            self.headers.clone(),
        ))
        .await
    }

    /// Reads the file at `path` and uploads its bytes. The reply carries the
    /// `file_uri` to pass to [`create_scan_task`](Client::create_scan_task).
    pub async fn upload_scan_file(&self, path: impl AsRef<Path>) -> Result<Value, Error> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            tracing::error!("Failed to read {}: {}", path.display(), source);
            Error::ReadFile {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.upload_scan_bytes(bytes).await
    }

    /// Uploads in-memory content as a scan file.
    ///
    /// The `application/octet-stream` content type applies to this request
    /// only.
    pub async fn upload_scan_bytes(&self, bytes: Vec<u8>) -> Result<Value, Error> {
        let mut headers = self.headers.clone();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        tracing::debug!("Uploading {} bytes", bytes.len());
        self.send_request(RequestEnvelope::new("/storage/uploadScanFile", headers).with_raw(bytes))
            .await
    }

    /// Starts an asynchronous scan of a previously uploaded file, using this
    /// client's analysis depth and sandbox settings.
    pub async fn create_scan_task(
        &self,
        file_uri: &str,
        file_name: &str,
        passwords_for_unpack: Vec<String>,
    ) -> Result<Value, Error> {
        let body =
            CreateScanTaskRequest::new(&self.config, file_uri, file_name, passwords_for_unpack);
        let envelope = RequestEnvelope::new("/analysis/createScanTask", self.headers.clone())
            .with_json(&body)?;
        self.send_request(envelope).await
    }

    /// Fetches the current state of a scan task.
    pub async fn check_scan_task(&self, scan_id: &str) -> Result<Value, Error> {
        let envelope = RequestEnvelope::new("/analysis/checkTask", self.headers.clone())
            .with_json(&ScanIdRequest::new(scan_id))?;
        self.send_request(envelope).await
    }

    /// Fetches the final report of a completed scan task.
    pub async fn check_scan_report(&self, scan_id: &str) -> Result<Value, Error> {
        let envelope = RequestEnvelope::new("/analysis/report", self.headers.clone())
            .with_json(&ScanIdRequest::new(scan_id))?;
        self.send_request(envelope).await
    }

    /// Lists the sandbox images available on the appliance.
    pub async fn get_images(&self) -> Result<Value, Error> {
        self.send_request(RequestEnvelope::new(
            "/engines/sandbox/getImages",
            self.headers.clone(),
        ))
        .await
    }
}

fn default_headers(api_key: &str) -> Result<HeaderMap, Error> {
    let mut api_key = HeaderValue::from_str(api_key).map_err(|e| {
        tracing::error!("API key is not a valid header value: {}", e);
        Error::InvalidApiKey
    })?;
    api_key.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, api_key);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
