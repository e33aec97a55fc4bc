//! Access to the remote anomaly-detection API
//!
//! [`DetectorGateway`] is the seam the lifecycle controller talks through.
//! [`HttpGateway`] is the REST implementation; [`MockGateway`] replays queued
//! responses and records every call for tests.

pub mod client;
pub mod http;
pub mod mock;

pub use client::{ClientSettings, RestClient};
pub use http::HttpGateway;
pub use mock::{GatewayCall, MockGateway};

use crate::entity::{DetectorPayload, SearchRequest};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failures reported by a gateway
///
/// `Remote` displays only the service's message so that errors such as a
/// name clash read the same way the service phrased them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{message}")]
    Remote { status: Option<u16>, message: String },

    #[error("request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("transport error: {message}")]
    Transport { message: String },
}

impl GatewayError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Remote operations on detectors
///
/// Response bodies are returned raw; decoding belongs to [`crate::mapper`].
#[async_trait]
pub trait DetectorGateway: Send + Sync {
    /// Returns the create response body, which carries the new id
    async fn create_detector(&self, payload: &DetectorPayload) -> Result<Vec<u8>, GatewayError>;

    async fn get_detector(&self, id: &str) -> Result<Vec<u8>, GatewayError>;

    async fn update_detector(&self, id: &str, payload: &DetectorPayload)
        -> Result<(), GatewayError>;

    async fn delete_detector(&self, id: &str) -> Result<(), GatewayError>;

    async fn start_detector(&self, id: &str) -> Result<(), GatewayError>;

    /// Returns the status message the service replied with, if any
    async fn stop_detector(&self, id: &str) -> Result<Option<String>, GatewayError>;

    async fn search_detector(&self, request: &SearchRequest) -> Result<Vec<u8>, GatewayError>;
}

/// Pulls the human-readable reason out of an error response body
///
/// Handles both `{"error": {"reason": ...}}` and `{"error": "..."}`; any
/// other body is returned trimmed.
pub fn error_reason(body: &str) -> String {
    let reason = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("error") {
            Some(Value::Object(error)) => error
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string),
            Some(Value::String(error)) => Some(error.clone()),
            _ => None,
        });

    reason.unwrap_or_else(|| body.trim().to_string())
}
