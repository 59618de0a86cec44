//! HttpTaxBackend - REST implementation of the workflow backend port.
//!
//! Talks JSON over HTTP to the extraction/tax/chat service. Every non-success
//! status is reported as [`BackendError::Status`] without further
//! interpretation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use taxflow_core::error::Result;
use taxflow_core::{BackendCall, BackendError, TaxflowError};
use taxflow_core::backend::{
    BackendResult, CalculateTaxRequest, ChatRequest, ChatResponse, TaxBackend, UploadDocument,
    UploadResponse,
};
use taxflow_core::config::TaxflowConfig;
use taxflow_core::review::ReviewSubmission;
use taxflow_core::tax::TaxComputation;

const UPLOAD_PATH: &str = "/api/upload-pdf";
const SESSION_PATH: &str = "/api/session";
const CALCULATE_PATH: &str = "/api/calculate-tax";
const CHAT_PATH: &str = "/api/chat";
const HEALTH_PATH: &str = "/api/health";

/// Multipart field name the upload endpoint expects.
const UPLOAD_FIELD: &str = "pdf";
const PDF_MIME: &str = "application/pdf";

/// Backend implementation that talks to the TaxFlow HTTP API.
#[derive(Clone)]
pub struct HttpTaxBackend {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

/// Body of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HttpTaxBackend {
    /// Creates a new backend client for the given origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Builds a client from loaded configuration.
    pub fn from_config(config: &TaxflowConfig) -> Self {
        let backend = Self::new(config.base_url());
        match config.request_timeout_secs {
            Some(secs) => backend.with_timeout(Duration::from_secs(secs)),
            None => backend,
        }
    }

    /// Sets a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn review_url(&self, session_id: &str) -> BackendResult<Url> {
        let mut url = Url::parse(&self.url(SESSION_PATH))
            .map_err(|e| BackendError::Transport(format!("Invalid backend URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Transport("Backend URL cannot be a base".to_string()))?
            .push(session_id)
            .push("review");
        Ok(url)
    }

    /// Checks the health endpoint.
    pub async fn health_check(&self) -> Result<HealthStatus> {
        let failed = |err| TaxflowError::remote(BackendCall::Health, err);
        let response = self
            .send(self.client.get(self.url(HEALTH_PATH)), HEALTH_PATH)
            .await
            .map_err(failed)?;
        decode(response).await.map_err(failed)
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> BackendResult<Response> {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        tracing::debug!("[HttpBackend] -> {}{}", self.base_url, endpoint);

        let response = request.send().await.map_err(|err| {
            tracing::warn!("[HttpBackend] {} request failed: {}", endpoint, err);
            BackendError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                "[HttpBackend] {} returned {}: {}",
                endpoint,
                status.as_u16(),
                body
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| BackendError::Decode(err.to_string()))
}

#[async_trait]
impl TaxBackend for HttpTaxBackend {
    async fn upload_document(&self, document: &UploadDocument) -> BackendResult<UploadResponse> {
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(PDF_MIME)
            .map_err(|e| BackendError::Transport(format!("Invalid upload part: {e}")))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::info!(
            "[HttpBackend] Uploading {} ({} bytes)",
            document.file_name,
            document.bytes.len()
        );
        let response = self
            .send(self.client.post(self.url(UPLOAD_PATH)).multipart(form), UPLOAD_PATH)
            .await?;
        decode(response).await
    }

    async fn submit_review(
        &self,
        session_id: &str,
        submission: &ReviewSubmission,
    ) -> BackendResult<()> {
        let url = self.review_url(session_id)?;
        // Body is ignored beyond the status code.
        self.send(self.client.post(url).json(submission), SESSION_PATH)
            .await?;
        Ok(())
    }

    async fn calculate_tax(&self, request: &CalculateTaxRequest) -> BackendResult<TaxComputation> {
        let response = self
            .send(
                self.client.post(self.url(CALCULATE_PATH)).json(request),
                CALCULATE_PATH,
            )
            .await?;
        decode(response).await
    }

    async fn chat(&self, request: &ChatRequest) -> BackendResult<ChatResponse> {
        let response = self
            .send(self.client.post(self.url(CHAT_PATH)).json(request), CHAT_PATH)
            .await?;
        decode(response).await
    }
}
