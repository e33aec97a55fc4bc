use super::{DetectorGateway, GatewayError};
use crate::entity::{DetectorPayload, SearchRequest};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One recorded call against [`MockGateway`]
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Create(DetectorPayload),
    Get(String),
    Update(String, DetectorPayload),
    Delete(String),
    Start(String),
    Stop(String),
    Search(String),
}

type Queue<T> = Mutex<VecDeque<Result<T, GatewayError>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next<T>(queue: &Queue<T>, operation: &str) -> Result<T, GatewayError> {
    lock(queue).pop_front().unwrap_or_else(|| {
        Err(GatewayError::transport(format!(
            "MockGateway: no queued {} response",
            operation
        )))
    })
}

/// Gateway double with one response queue per operation
///
/// Calls are recorded in order regardless of outcome, so tests can assert
/// the exact sequence the controller issued.
#[derive(Default)]
pub struct MockGateway {
    creates: Queue<Vec<u8>>,
    gets: Queue<Vec<u8>>,
    updates: Queue<()>,
    deletes: Queue<()>,
    starts: Queue<()>,
    stops: Queue<Option<String>>,
    searches: Queue<Vec<u8>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(&self, response: Result<Vec<u8>, GatewayError>) -> &Self {
        lock(&self.creates).push_back(response);
        self
    }

    pub fn on_get(&self, response: Result<Vec<u8>, GatewayError>) -> &Self {
        lock(&self.gets).push_back(response);
        self
    }

    pub fn on_update(&self, response: Result<(), GatewayError>) -> &Self {
        lock(&self.updates).push_back(response);
        self
    }

    pub fn on_delete(&self, response: Result<(), GatewayError>) -> &Self {
        lock(&self.deletes).push_back(response);
        self
    }

    pub fn on_start(&self, response: Result<(), GatewayError>) -> &Self {
        lock(&self.starts).push_back(response);
        self
    }

    pub fn on_stop(&self, response: Result<Option<String>, GatewayError>) -> &Self {
        lock(&self.stops).push_back(response);
        self
    }

    pub fn on_search(&self, response: Result<Vec<u8>, GatewayError>) -> &Self {
        lock(&self.searches).push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: GatewayCall) {
        lock(&self.calls).push(call);
    }

    /// Create response body carrying `id`
    pub fn created(id: &str) -> Vec<u8> {
        json!({"_id": id, "_version": 1}).to_string().into_bytes()
    }

    /// Search response body with one hit per `(id, name)` pair
    pub fn search_hits(hits: &[(&str, &str)]) -> Vec<u8> {
        let hits: Vec<_> = hits
            .iter()
            .map(|(id, name)| json!({"_id": id, "_source": {"name": name}}))
            .collect();
        json!({"hits": {"total": {"value": hits.len()}, "hits": hits}})
            .to_string()
            .into_bytes()
    }

    /// Get response body for a minimal detector
    pub fn detector(id: &str, name: &str, last_update_time: i64) -> Vec<u8> {
        json!({
            "_id": id,
            "_version": 1,
            "anomaly_detector": {
                "name": name,
                "description": "Test detector",
                "time_field": "timestamp",
                "indices": ["order*"],
                "filter_query": {"bool": {"filter": [{"exists": {"field": "value"}}]}},
                "detection_interval": {"period": {"interval": 5, "unit": "Minutes"}},
                "window_delay": {"period": {"interval": 1, "unit": "Minutes"}},
                "schema_version": 0,
                "feature_attributes": [{
                    "feature_name": "total_order",
                    "feature_enabled": true,
                    "aggregation_query": {"total_order": {"sum": {"field": "value"}}}
                }],
                "last_update_time": last_update_time
            }
        })
        .to_string()
        .into_bytes()
    }
}

#[async_trait]
impl DetectorGateway for MockGateway {
    async fn create_detector(&self, payload: &DetectorPayload) -> Result<Vec<u8>, GatewayError> {
        self.record(GatewayCall::Create(payload.clone()));
        next(&self.creates, "create")
    }

    async fn get_detector(&self, id: &str) -> Result<Vec<u8>, GatewayError> {
        self.record(GatewayCall::Get(id.to_string()));
        next(&self.gets, "get")
    }

    async fn update_detector(
        &self,
        id: &str,
        payload: &DetectorPayload,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::Update(id.to_string(), payload.clone()));
        next(&self.updates, "update")
    }

    async fn delete_detector(&self, id: &str) -> Result<(), GatewayError> {
        self.record(GatewayCall::Delete(id.to_string()));
        next(&self.deletes, "delete")
    }

    async fn start_detector(&self, id: &str) -> Result<(), GatewayError> {
        self.record(GatewayCall::Start(id.to_string()));
        next(&self.starts, "start")
    }

    async fn stop_detector(&self, id: &str) -> Result<Option<String>, GatewayError> {
        self.record(GatewayCall::Stop(id.to_string()));
        next(&self.stops, "stop")
    }

    async fn search_detector(&self, request: &SearchRequest) -> Result<Vec<u8>, GatewayError> {
        self.record(GatewayCall::Search(request.pattern().to_string()));
        next(&self.searches, "search")
    }
}

impl std::fmt::Debug for MockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGateway")
            .field("calls", &lock(&self.calls).len())
            .finish()
    }
}
