//! Report download transport
//!
//! The downloader returns the raw gzipped payload; decompression and parsing
//! happen downstream. Errors are classified at this boundary so the task
//! layer can decide between the auth-retry path, surfacing a transient
//! failure, and giving up outright.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use anyhow::Context;

use crate::auth::Credential;
use crate::definition::ReportRequest;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// The credential was rejected; refresh and retry once.
    #[error("authorization rejected: {0}")]
    AuthExpired(String),
    /// The service or network hiccuped; the request itself is fine.
    #[error("transient download failure: {0}")]
    Transient(String),
    /// The request is broken or the resource is gone; retrying cannot help.
    #[error("permanent download failure: {0}")]
    Permanent(String),
}

#[async_trait]
pub trait ReportDownloader: Send + Sync {
    async fn fetch(
        &self,
        request: &ReportRequest,
        account_id: u64,
        credential: &Credential,
    ) -> Result<Vec<u8>, DownloadError>;
}

pub struct HttpReportDownloader {
    client: Client,
    endpoint: String,
}

impl HttpReportDownloader {
    pub fn new(endpoint: String, user_agent: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .context("failed to build report download client")?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ReportDownloader for HttpReportDownloader {
    async fn fetch(
        &self,
        request: &ReportRequest,
        account_id: u64,
        credential: &Credential,
    ) -> Result<Vec<u8>, DownloadError> {
        debug!(
            account_id,
            report_type = %request.report_type,
            "requesting report download"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&credential.token)
            .header("clientCustomerId", account_id.to_string())
            .json(request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let payload = response.bytes().await.map_err(classify_reqwest_error)?;
        Ok(payload.to_vec())
    }
}

fn classify_status(status: StatusCode, body: &str) -> DownloadError {
    let detail = format!("{status}: {}", body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DownloadError::AuthExpired(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            DownloadError::Transient(detail)
        },
        s if s.is_server_error() => DownloadError::Transient(detail),
        _ => DownloadError::Permanent(detail),
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> DownloadError {
    if err.is_timeout() || err.is_connect() {
        DownloadError::Transient(err.to_string())
    } else {
        DownloadError::Permanent(err.to_string())
    }
}
