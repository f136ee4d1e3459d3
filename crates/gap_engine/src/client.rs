use std::time::Duration;

use futures_util::StreamExt;
use gap_logging::{gap_debug, gap_info};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::{AnalysisError, AnalysisRequest, Document, FailureKind};

/// Analysis endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/analyze";
/// Multipart field carrying the CV document.
pub const CV_FIELD: &str = "cv";
/// Multipart field carrying the job description text.
pub const JOB_DESCRIPTION_FIELD: &str = "job_description";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Posts the request and returns the decoded JSON body.
    async fn send(&self, request: &AnalysisRequest) -> Result<Value, AnalysisError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAnalysisClient {
    settings: ClientSettings,
    endpoint: reqwest::Url,
    client: reqwest::Client,
}

impl ReqwestAnalysisClient {
    pub fn new(settings: ClientSettings) -> Result<Self, AnalysisError> {
        let endpoint = reqwest::Url::parse(&settings.endpoint)
            .map_err(|err| AnalysisError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| AnalysisError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    fn build_form(request: &AnalysisRequest) -> Result<Form, AnalysisError> {
        Ok(Form::new()
            .part(CV_FIELD, document_part(&request.document)?)
            .text(JOB_DESCRIPTION_FIELD, request.job_description.clone()))
    }
}

fn document_part(document: &Document) -> Result<Part, AnalysisError> {
    Part::stream_with_length(document.bytes.clone(), document.bytes.len() as u64)
        .file_name(document.file_name.clone())
        .mime_str(document.content_type)
        .map_err(|err| AnalysisError::new(FailureKind::Document, err.to_string()))
}

#[async_trait::async_trait]
impl AnalysisClient for ReqwestAnalysisClient {
    async fn send(&self, request: &AnalysisRequest) -> Result<Value, AnalysisError> {
        let form = Self::build_form(request)?;
        gap_info!(
            "Dispatching analysis to {} cv={} ({} bytes) job_description_len={}",
            self.endpoint,
            request.document.file_name,
            request.document.bytes.len(),
            request.job_description.len()
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        gap_debug!("Analysis service answered {}", status);
        if !status.is_success() {
            return Err(AnalysisError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(AnalysisError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(AnalysisError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| AnalysisError::new(FailureKind::InvalidResponse, err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        return AnalysisError::new(FailureKind::Timeout, err.to_string());
    }
    AnalysisError::new(FailureKind::Network, err.to_string())
}
