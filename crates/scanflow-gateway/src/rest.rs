//! REST gateway implementation.
//!
//! One client spanning two logical services: the primary API (patients,
//! kits, code linking) and the analysis service on a separate base host
//! (photo uploads). Every call carries a bearer token from the
//! [`TokenProvider`]; timeouts are enforced here so callers never wait
//! unbounded.

use crate::dto::{LinkCodeRequest, PatientDto, TestKitDto};
use crate::token::TokenProvider;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use scanflow_core::capture::PhotoCapture;
use scanflow_core::error::{Result, ScanError};
use scanflow_core::gateway::Gateway;
use scanflow_core::kit::TestKit;
use scanflow_core::patient::PatientRecord;
use scanflow_core::session::Subject;
use std::sync::Arc;
use std::time::Duration;

/// Request timeout applied to every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Multipart field name the analysis service expects the image under.
const IMAGE_PART_NAME: &str = "image";

/// Gateway implementation over the two REST backends.
pub struct RestGateway {
    client: Client,
    /// Primary API base URL, e.g. `https://api.example.com/api`.
    api_base: String,
    /// Analysis service base URL (separate host from the primary API).
    analysis_base: String,
    tokens: Arc<dyn TokenProvider>,
}

impl RestGateway {
    /// Creates a gateway talking to the given base URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        analysis_base: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScanError::transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base: trim_trailing_slash(api_base.into()),
            analysis_base: trim_trailing_slash(analysis_base.into()),
            tokens,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn analysis_url(&self, path: &str) -> String {
        format!("{}/{}", self.analysis_base, path)
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens.access_token().await
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn list_patients(&self) -> Result<Vec<PatientRecord>> {
        let url = self.api_url("doctor/patients/");
        log::debug!("GET {} (Authorization: Bearer [REDACTED])", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await
            .map_err(|e| ScanError::candidate_fetch(e.to_string()))?;
        let rows: Vec<PatientDto> = check_status(response, fetch_error)
            .await?
            .json()
            .await
            .map_err(|e| ScanError::candidate_fetch(e.to_string()))?;
        Ok(rows.into_iter().map(PatientRecord::from).collect())
    }

    async fn list_kits(&self, subject: &Subject) -> Result<Vec<TestKit>> {
        let url = self.api_url("qr-codes/list/");
        log::debug!("GET {} (Authorization: Bearer [REDACTED])", url);
        let mut request = self.client.get(&url).bearer_auth(self.bearer().await?);
        // Professionals scope the list by patient; patients get their own.
        if let Some(patient_id) = subject.patient_id() {
            request = request.query(&[("user_id", patient_id)]);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ScanError::candidate_fetch(e.to_string()))?;
        let rows: Vec<TestKitDto> = check_status(response, fetch_error)
            .await?
            .json()
            .await
            .map_err(|e| ScanError::candidate_fetch(e.to_string()))?;
        Ok(rows.into_iter().map(TestKit::from).collect())
    }

    async fn link_code(&self, subject: &Subject, code: &str) -> Result<()> {
        let url = self.api_url("qr-codes/");
        log::debug!("POST {} (Authorization: Bearer [REDACTED])", url);
        let body = LinkCodeRequest {
            qr_data: code.to_string(),
            user_id: subject.patient_id(),
        };
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScanError::transport(e.to_string()))?;
        check_status(response, action_error).await?;
        Ok(())
    }

    async fn upload_photo(&self, kit_code: &str, photo: &PhotoCapture) -> Result<()> {
        let url = self.analysis_url("upload-photo");
        log::debug!(
            "POST {}?code={} (Authorization: Bearer [REDACTED])",
            url,
            kit_code
        );
        let bytes = tokio::fs::read(photo_path(&photo.uri))
            .await
            .map_err(|e| ScanError::action(format!("cannot read captured photo: {}", e)))?;
        let part = Part::bytes(bytes)
            .file_name("capture.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ScanError::transport(e.to_string()))?;
        let form = Form::new().part(IMAGE_PART_NAME, part);
        let response = self
            .client
            .post(&url)
            .query(&[("code", kit_code)])
            .bearer_auth(self.bearer().await?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ScanError::transport(e.to_string()))?;
        check_status(response, action_error).await?;
        Ok(())
    }
}

/// Strips a `file://` scheme so the capture URI can be read from disk.
pub(crate) fn photo_path(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}

fn trim_trailing_slash(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}

async fn check_status(
    response: reqwest::Response,
    classify: fn(StatusCode, String) -> ScanError,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::warn!("request failed: {} {}", status, body);
    Err(classify(status, body))
}

fn fetch_error(status: StatusCode, body: String) -> ScanError {
    ScanError::candidate_fetch(format!("{}: {}", status, body))
}

fn action_error(status: StatusCode, body: String) -> ScanError {
    ScanError::action(format!("{}: {}", status, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::StaticTokenProvider;

    #[test]
    fn photo_path_strips_the_file_scheme() {
        assert_eq!(photo_path("file:///tmp/a.jpg"), "/tmp/a.jpg");
        assert_eq!(photo_path("/tmp/a.jpg"), "/tmp/a.jpg");
    }

    #[test]
    fn base_urls_are_normalized() {
        let gateway = RestGateway::new(
            "https://api.example.com/api/",
            "https://analysis.example.com/",
            Arc::new(StaticTokenProvider::new("t")),
        )
        .unwrap();
        assert_eq!(
            gateway.api_url("doctor/patients/"),
            "https://api.example.com/api/doctor/patients/"
        );
        assert_eq!(
            gateway.analysis_url("upload-photo"),
            "https://analysis.example.com/upload-photo"
        );
    }

    #[tokio::test]
    async fn empty_static_token_is_a_transport_error() {
        let provider = StaticTokenProvider::new("");
        use crate::token::TokenProvider;
        assert!(provider.access_token().await.is_err());
    }
}
