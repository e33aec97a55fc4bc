//! Thin REST client shared by the detector gateway and the platform lookup

use super::{error_reason, GatewayError};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Connection settings for the search cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl ClientSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    settings: ClientSettings,
}

impl RestClient {
    pub fn new(settings: ClientSettings) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, settings })
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    /// Joins the endpoint and a relative path with exactly one slash
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn send_json<B>(&self, method: Method, path: &str, body: &B) -> Result<Vec<u8>, GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(method, path).json(body);
        self.execute(request).await
    }

    pub async fn send_empty(&self, method: Method, path: &str) -> Result<Vec<u8>, GatewayError> {
        let request = self.request(method, path);
        self.execute(request).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Sending request");

        let request = self.http.request(method, url);
        match &self.settings.username {
            Some(username) => request.basic_auth(username, self.settings.password.as_deref()),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, GatewayError> {
        let response = request.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_transport(e))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Received response");

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let text = String::from_utf8_lossy(&body);
        let message = if text.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            error_reason(&text)
        };
        Err(GatewayError::remote(Some(status.as_u16()), message))
    }

    fn map_transport(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout {
                seconds: self.settings.timeout.as_secs(),
            }
        } else {
            GatewayError::transport(error.to_string())
        }
    }
}
