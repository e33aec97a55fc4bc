//! Terms-aggregation request and response used to list distinct field values

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the aggregation bucket set in both request and response
pub const DISTINCT_AGGREGATION: &str = "items";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Terms {
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistinctGroups {
    pub terms: Terms,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub items: DistinctGroups,
}

/// `{"size": 0, "aggs": {"items": {"terms": {"field": ...}}}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistinctValuesRequest {
    pub size: u32,
    pub aggs: Aggregate,
}

impl DistinctValuesRequest {
    pub fn for_field(field: &str) -> Self {
        Self {
            size: 0,
            aggs: Aggregate {
                items: DistinctGroups {
                    terms: Terms {
                        field: field.to_string(),
                    },
                },
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Bucket {
    pub key: Value,
    #[serde(default)]
    pub doc_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Items {
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aggregations {
    #[serde(default)]
    pub items: Items,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistinctValuesResponse {
    #[serde(default)]
    pub aggregations: Aggregations,
}

impl DistinctValuesResponse {
    /// Bucket keys in the order the service returned them
    pub fn into_values(self) -> Vec<Value> {
        self.aggregations
            .items
            .buckets
            .into_iter()
            .map(|bucket| bucket.key)
            .collect()
    }
}
