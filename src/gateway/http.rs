use super::client::RestClient;
use super::{DetectorGateway, GatewayError};
use crate::entity::{DetectorPayload, SearchRequest};
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

/// Base path of the anomaly-detection plugin
pub const DETECTORS_PATH: &str = "_plugins/_anomaly_detection/detectors";

/// REST implementation of [`DetectorGateway`]
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Arc<RestClient>,
}

impl HttpGateway {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }

    fn detector_path(id: &str) -> String {
        format!("{}/{}", DETECTORS_PATH, id)
    }
}

#[async_trait]
impl DetectorGateway for HttpGateway {
    async fn create_detector(&self, payload: &DetectorPayload) -> Result<Vec<u8>, GatewayError> {
        self.client.send_json(Method::POST, DETECTORS_PATH, payload).await
    }

    async fn get_detector(&self, id: &str) -> Result<Vec<u8>, GatewayError> {
        self.client
            .send_empty(Method::GET, &Self::detector_path(id))
            .await
    }

    async fn update_detector(
        &self,
        id: &str,
        payload: &DetectorPayload,
    ) -> Result<(), GatewayError> {
        self.client
            .send_json(Method::PUT, &Self::detector_path(id), payload)
            .await?;
        Ok(())
    }

    async fn delete_detector(&self, id: &str) -> Result<(), GatewayError> {
        self.client
            .send_empty(Method::DELETE, &Self::detector_path(id))
            .await?;
        Ok(())
    }

    async fn start_detector(&self, id: &str) -> Result<(), GatewayError> {
        let path = format!("{}/_start", Self::detector_path(id));
        self.client.send_empty(Method::POST, &path).await?;
        Ok(())
    }

    async fn stop_detector(&self, id: &str) -> Result<Option<String>, GatewayError> {
        let path = format!("{}/_stop", Self::detector_path(id));
        let body = self.client.send_empty(Method::POST, &path).await?;

        let message = String::from_utf8_lossy(&body).trim().to_string();
        Ok(if message.is_empty() { None } else { Some(message) })
    }

    async fn search_detector(&self, request: &SearchRequest) -> Result<Vec<u8>, GatewayError> {
        let path = format!("{}/_search", DETECTORS_PATH);
        self.client.send_json(Method::POST, &path, request).await
    }
}
