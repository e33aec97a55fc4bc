//! Lookups against the indices a detector reads from

pub mod http;
pub mod mock;

pub use http::HttpPlatform;
pub use mock::{MockPlatform, PlatformCall};

use crate::gateway::GatewayError;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("failed to decode distinct values of '{field}': {source}")]
    InvalidResponse {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait PlatformController: Send + Sync {
    /// Distinct values of `field` across `index`, in the order the service
    /// returned them
    async fn get_distinct_values(&self, index: &str, field: &str)
        -> Result<Vec<Value>, PlatformError>;
}
