//! Backend client.
//!
//! Thin JSON-over-HTTPS wrapper for the two endpoints this crate consumes.
//! The session is passed per call; the client itself holds no credentials.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::types::api::{LoginRequest, LoginResponse, RecordingLink};
use crate::types::errors::ApiError;
use crate::types::session::Session;
use crate::types::settings::ApiSettings;

/// Resolves a recording reference to a short-lived download link.
#[async_trait]
pub trait RecordingApi: Send + Sync {
    async fn resolve_recording(
        &self,
        session: &Session,
        meeting_id: &str,
    ) -> Result<RecordingLink, ApiError>;
}

/// HTTP client for the e-learning backend.
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid base URL: {}", e)))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Builds `<base>/<segment>/<segment>...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidResponse("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpStatus(status.as_u16(), body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Exchanges credentials for a bearer token and the user's profile.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let response = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;
        Self::decode(response).await
    }
}

#[async_trait]
impl RecordingApi for BackendClient {
    #[instrument(skip(self, session))]
    async fn resolve_recording(
        &self,
        session: &Session,
        meeting_id: &str,
    ) -> Result<RecordingLink, ApiError> {
        let url = self.endpoint(&["getDownloadRecording", meeting_id])?;
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, session.bearer())
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;
        let link: RecordingLink = Self::decode(response).await?;
        debug!(file_size = link.file_size, has_url = link.usable_url().is_some(), "recording link resolved");
        Ok(link)
    }
}
