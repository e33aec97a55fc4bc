//! Detector definitions, both user-facing and on the wire
//!
//! User-facing types (`DetectorRequest`, `UpdateDetectorUserInput`,
//! `DetectorOutput`) are what operators read and write as JSON files. Wire
//! types (`DetectorPayload`, `DetectorDocument`, search types) mirror the
//! remote anomaly-detection API and are only ever built or decoded by
//! [`crate::mapper`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unit the remote service uses for detection intervals and window delays
pub const MINUTES_UNIT: &str = "Minutes";

/// Feature as written by the operator in a create file
///
/// Only the first aggregation type and the first field are used; the lists
/// exist because that is the shape of the published file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub aggregation_type: Vec<String>,
    pub enabled: bool,
    pub field: Vec<String>,
}

/// Request to create one detector, or one detector per partition value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub time_field: String,
    pub index: Vec<String>,
    #[serde(default)]
    pub features: Vec<FeatureRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    pub interval: String,
    #[serde(rename = "window_delay")]
    pub delay: String,
    #[serde(default)]
    pub start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_field: Option<String>,
}

impl DetectorRequest {
    /// Partition field, treating an empty string the same as an absent one
    pub fn partition_field(&self) -> Option<&str> {
        self.partition_field
            .as_deref()
            .filter(|field| !field.trim().is_empty())
    }

    /// Skeleton printed by `adctl generate`
    pub fn skeleton() -> Self {
        Self {
            name: "Detector Name".to_string(),
            description: "A brief description".to_string(),
            time_field: String::new(),
            index: Vec::new(),
            features: vec![FeatureRequest {
                aggregation_type: vec!["count".to_string()],
                enabled: false,
                field: Vec::new(),
            }],
            filter: Some(Value::Object(serde_json::Map::new())),
            interval: "10m".to_string(),
            delay: "1m".to_string(),
            start: false,
            partition_field: Some(String::new()),
        }
    }
}

/// Expanded feature, shared by the wire format and user-facing output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "feature_name")]
    pub name: String,
    #[serde(rename = "feature_enabled")]
    pub enabled: bool,
    pub aggregation_query: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(rename = "interval")]
    pub duration: u64,
    pub unit: String,
}

/// Wrapper matching the remote `{"period": {...}}` shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub period: Period,
}

impl Interval {
    pub fn minutes(duration: u64) -> Self {
        Self {
            period: Period {
                duration,
                unit: MINUTES_UNIT.to_string(),
            },
        }
    }
}

/// Body of the remote create and update calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorPayload {
    pub name: String,
    pub description: String,
    pub time_field: String,
    pub indices: Vec<String>,
    pub feature_attributes: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_query: Option<Value>,
    pub detection_interval: Interval,
    pub window_delay: Interval,
}

/// Detector as stored by the remote service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteDetector {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub time_field: String,
    #[serde(default)]
    pub indices: Vec<String>,
    #[serde(default)]
    pub feature_attributes: Vec<Feature>,
    #[serde(default)]
    pub filter_query: Option<Value>,
    pub detection_interval: Interval,
    pub window_delay: Interval,
    #[serde(default)]
    pub schema_version: i32,
    #[serde(default)]
    pub last_update_time: i64,
}

/// Envelope returned by the remote get endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub anomaly_detector: RemoteDetector,
}

/// Envelope returned by the remote create endpoint; only the id is needed
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResponse {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Detector as shown to the operator by `get`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorOutput {
    pub id: String,
    pub name: String,
    pub description: String,
    pub time_field: String,
    pub indices: Vec<String>,
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_query: Option<Value>,
    pub detection_interval: String,
    pub window_delay: String,
    pub last_update_time: i64,
    pub schema_version: i32,
}

/// Edited detector submitted by `update`
///
/// `last_update_time` is the optimistic concurrency token: it must be the
/// value the operator fetched before editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDetectorUserInput {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub time_field: String,
    pub indices: Vec<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_query: Option<Value>,
    pub detection_interval: String,
    pub window_delay: String,
    #[serde(default)]
    pub last_update_time: i64,
    #[serde(default)]
    pub schema_version: i32,
}

impl From<DetectorOutput> for UpdateDetectorUserInput {
    fn from(output: DetectorOutput) -> Self {
        Self {
            id: output.id,
            name: output.name,
            description: output.description,
            time_field: output.time_field,
            indices: output.indices,
            features: output.features,
            filter_query: output.filter_query,
            detection_interval: output.detection_interval,
            window_delay: output.window_delay,
            last_update_time: output.last_update_time,
            schema_version: output.schema_version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub r#match: Match,
}

/// By-name search sent to the remote search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: SearchQuery,
}

impl SearchRequest {
    pub fn pattern(&self) -> &str {
        &self.query.r#match.name
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Option<SearchHits>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Option<HitSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitSource {
    #[serde(default)]
    pub name: String,
}

/// Id and name of a detector matched by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorSummary {
    pub id: String,
    pub name: String,
}

/// Detector created by a (possibly multi-entity) create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDetector {
    pub id: String,
    pub name: String,
}
