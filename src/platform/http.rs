use super::{PlatformController, PlatformError};
use crate::entity::{DistinctValuesRequest, DistinctValuesResponse};
use crate::gateway::RestClient;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Runs a terms aggregation through the cluster's `_search` endpoint
#[derive(Debug, Clone)]
pub struct HttpPlatform {
    client: Arc<RestClient>,
}

impl HttpPlatform {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlatformController for HttpPlatform {
    async fn get_distinct_values(
        &self,
        index: &str,
        field: &str,
    ) -> Result<Vec<Value>, PlatformError> {
        let path = format!("{}/_search", index);
        let request = DistinctValuesRequest::for_field(field);
        let body = self.client.send_json(Method::POST, &path, &request).await?;

        let response: DistinctValuesResponse =
            serde_json::from_slice(&body).map_err(|source| PlatformError::InvalidResponse {
                field: field.to_string(),
                source,
            })?;
        let values = response.into_values();
        debug!(index, field, count = values.len(), "Fetched distinct values");
        Ok(values)
    }
}
