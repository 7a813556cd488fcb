//! Google Cloud Video Intelligence Provider
//!
//! REST adapter for the `videos:annotate` long-running operation and the
//! operations endpoint used to poll it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::core::annotations::{AnalysisRequest, AnnotationApi};
use crate::core::jobs::OperationSnapshot;
use crate::core::settings::{ClientSettings, Credential, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::core::{CoreError, CoreResult, OperationName};

/// Header carrying an API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest error body echoed back when it is not a JSON error envelope
const MAX_ERROR_BODY_CHARS: usize = 500;

// =============================================================================
// API Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

// =============================================================================
// GoogleCloudProvider
// =============================================================================

/// Video Intelligence REST client
pub struct GoogleCloudProvider {
    client: reqwest::Client,
    credential: Credential,
    base_url: String,
}

impl std::fmt::Debug for GoogleCloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCloudProvider")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl GoogleCloudProvider {
    /// Creates a provider with the default endpoint and timeout
    pub fn new(credential: Credential) -> CoreResult<Self> {
        Self::with_timeout(credential, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Creates a provider with a custom per-request timeout
    pub fn with_timeout(credential: Credential, timeout: Duration) -> CoreResult<Self> {
        if credential.is_empty() {
            return Err(CoreError::ValidationError(
                "Video Intelligence credential cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Creates a provider from client settings
    pub fn from_settings(settings: &ClientSettings) -> CoreResult<Self> {
        settings.validate()?;

        let credential = settings.credential().ok_or_else(|| {
            CoreError::ValidationError(
                "No credential configured: set an API key or an access token".to_string(),
            )
        })?;

        Ok(
            Self::with_timeout(credential, Duration::from_secs(settings.request_timeout_secs))?
                .with_base_url(&settings.base_url),
        )
    }

    /// Set custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn annotate_url(&self) -> String {
        format!("{}/videos:annotate", self.base_url)
    }

    /// Regional names (`us-east1.123`) live under `operations/`; fully
    /// qualified names (`projects/.../operations/...`) are used as-is.
    fn operation_url(&self, name: &str) -> String {
        if name.contains('/') {
            format!("{}/{}", self.base_url, name.trim_start_matches('/'))
        } else {
            format!("{}/operations/{}", self.base_url, name)
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Credential::ApiKey(key) => request.header(API_KEY_HEADER, key),
            Credential::BearerToken(token) => request.bearer_auth(token),
        }
    }

    /// Parse an error response body
    fn parse_api_error(status: StatusCode, body: &str) -> CoreError {
        if let Ok(err_resp) = serde_json::from_str::<ApiErrorResponse>(body) {
            if let Some(detail) = err_resp.error {
                return CoreError::RequestFailed(format!(
                    "Video Intelligence API error ({}): {} (status: {}, code: {})",
                    status,
                    detail.message.unwrap_or_default(),
                    detail.status.unwrap_or_default(),
                    detail.code.unwrap_or_else(|| i32::from(status.as_u16())),
                ));
            }
        }

        let truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        CoreError::RequestFailed(format!(
            "Video Intelligence API error ({}): {}",
            status, truncated
        ))
    }

    /// Sends a request and decodes a successful JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> CoreResult<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| CoreError::RequestFailed(format!("Network error during {}: {}", what, e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            CoreError::RequestFailed(format!("Failed to read {} response: {}", what, e))
        })?;

        if !status.is_success() {
            return Err(Self::parse_api_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AnnotationApi for GoogleCloudProvider {
    fn name(&self) -> &str {
        "google_cloud"
    }

    async fn annotate(&self, request: &AnalysisRequest) -> CoreResult<OperationName> {
        let body = request.to_wire();
        debug!(
            "POST {} (features: {:?}, inline: {})",
            self.annotate_url(),
            body.features,
            body.input_content.is_some()
        );

        let response: AnnotateResponse = self
            .send_json(self.client.post(self.annotate_url()).json(&body), "annotate")
            .await?;

        if response.name.is_empty() {
            return Err(CoreError::SubmissionFailed(
                "Service accepted the request but returned no operation name".to_string(),
            ));
        }

        Ok(response.name)
    }

    async fn get_operation(&self, name: &str) -> CoreResult<OperationSnapshot> {
        let url = self.operation_url(name);
        debug!("GET {}", url);

        let mut snapshot: OperationSnapshot =
            self.send_json(self.client.get(&url), "operation poll").await?;
        if snapshot.name.is_empty() {
            snapshot.name = name.to_string();
        }

        Ok(snapshot)
    }
}

// =============================================================================
// Tests
// =============================================================================
