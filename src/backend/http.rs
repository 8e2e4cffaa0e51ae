//! reqwest implementation of [`SessionBackend`] with a uniform timeout and error
//! policy. Error bodies are sanitized before they reach callers; request bodies
//! are never logged.

use super::{
    BackendError, ExchangeRequest, LogoutEvent, SessionBackend, SessionResponse, TickRequest,
    EXCHANGE_PATH, LOGOUT_PATH, TICK_PATH,
};
use crate::APP_USER_AGENT;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout applied to every backend call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Builds a backend client for `base_url` with the default timeout.
    ///
    /// # Errors
    /// Returns an error if the URL is not absolute or the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if the URL is not absolute or the client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = base_url.trim();
        Url::parse(base_url).map_err(|err| BackendError::Url(format!("{base_url}: {err}")))?;

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Client(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let url = build_url_with_base(&self.base_url, path);
        Url::parse(&url).map_err(|err| BackendError::Url(format!("{url}: {err}")))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, BackendError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(BackendError::Http {
                status,
                message: sanitize_body(&body),
            })
        }
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let response = self.send(path, body).await?;
        let text = response.text().await.map_err(map_request_error)?;
        serde_json::from_str(&text).map_err(|err| BackendError::Parse(err.to_string()))
    }
}

#[async_trait]
impl SessionBackend for HttpBackend {
    #[instrument(skip(self, request))]
    async fn exchange(&self, request: &ExchangeRequest) -> Result<SessionResponse, BackendError> {
        self.post_json(EXCHANGE_PATH, request).await
    }

    #[instrument(skip(self, request))]
    async fn tick(&self, request: &TickRequest) -> Result<SessionResponse, BackendError> {
        self.post_json(TICK_PATH, request).await
    }

    #[instrument(skip(self, event))]
    async fn log_out(&self, event: &LogoutEvent) -> Result<(), BackendError> {
        self.send(LOGOUT_PATH, event).await.map(|_| ())
    }
}

/// Joins an explicit base URL and a path without doubling slashes.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_decode() {
        BackendError::Parse(err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

/// Trims and truncates HTTP error bodies.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
