//! Pure transforms between user-facing detector definitions and the wire format
//!
//! Nothing here performs I/O. Every function either builds a request body
//! for the remote service or decodes one of its responses, failing with a
//! [`MapperError`] on malformed input.

use crate::entity::{
    CreateResponse, DetectorDocument, DetectorOutput, DetectorPayload, DetectorRequest,
    DetectorSummary, Feature, FeatureRequest, Interval, Match, SearchQuery, SearchRequest,
    SearchResponse, UpdateDetectorUserInput,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors raised while building payloads or decoding responses
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("invalid duration '{0}': expected a whole number of minutes, hours or days such as 10m")]
    InvalidDuration(String),

    #[error("unsupported interval unit '{0}'")]
    UnsupportedUnit(String),

    #[error("feature at position {position} needs at least one aggregation type and one field")]
    IncompleteFeature { position: usize },

    #[error("failed to decode {what}: {source}")]
    InvalidResponse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Expands a feature request into a named aggregation
///
/// `{"aggregation_type": ["sum"], "field": ["value"]}` becomes a feature named
/// `value_sum` with query `{"value_sum": {"sum": {"field": "value"}}}`.
pub fn feature_from_request(
    request: &FeatureRequest,
    position: usize,
) -> Result<Feature, MapperError> {
    let (aggregation, field) = match (request.aggregation_type.first(), request.field.first()) {
        (Some(aggregation), Some(field)) if !aggregation.is_empty() && !field.is_empty() => {
            (aggregation, field)
        }
        _ => return Err(MapperError::IncompleteFeature { position }),
    };

    let name = format!("{}_{}", field, aggregation);
    let mut query = serde_json::Map::new();
    query.insert(name.clone(), json!({ aggregation.as_str(): { "field": field } }));

    Ok(Feature {
        name,
        enabled: request.enabled,
        aggregation_query: Value::Object(query),
    })
}

/// Parses `"10m"`, `"2h"` or `"1d"` into a minutes-based interval
pub fn parse_interval(text: &str) -> Result<Interval, MapperError> {
    let trimmed = text.trim();
    let invalid = || MapperError::InvalidDuration(text.to_string());

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = trimmed.split_at(split);
    let magnitude: u64 = digits.parse().map_err(|_| invalid())?;

    let multiplier = match unit {
        "m" | "min" => 1,
        "h" => 60,
        "d" => 60 * 24,
        _ => return Err(invalid()),
    };

    let minutes = magnitude.checked_mul(multiplier).ok_or_else(invalid)?;
    if minutes == 0 {
        return Err(invalid());
    }
    Ok(Interval::minutes(minutes))
}

/// Renders an interval back to the short text form used in detector files
pub fn format_interval(interval: &Interval) -> Result<String, MapperError> {
    let suffix = match interval.period.unit.to_ascii_lowercase().as_str() {
        "minutes" => "m",
        "hours" => "h",
        "days" => "d",
        _ => return Err(MapperError::UnsupportedUnit(interval.period.unit.clone())),
    };
    Ok(format!("{}{}", interval.period.duration, suffix))
}

/// Builds the create payload for a single detector
pub fn create_payload(request: &DetectorRequest) -> Result<DetectorPayload, MapperError> {
    let feature_attributes = request
        .features
        .iter()
        .enumerate()
        .map(|(position, feature)| feature_from_request(feature, position))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DetectorPayload {
        name: request.name.clone(),
        description: request.description.clone(),
        time_field: request.time_field.clone(),
        indices: request.index.clone(),
        feature_attributes,
        filter_query: effective_filter(request.filter.as_ref()).cloned(),
        detection_interval: parse_interval(&request.interval)?,
        window_delay: parse_interval(&request.delay)?,
    })
}

/// Builds the update payload from an edited detector
pub fn update_payload(input: &UpdateDetectorUserInput) -> Result<DetectorPayload, MapperError> {
    Ok(DetectorPayload {
        name: input.name.clone(),
        description: input.description.clone(),
        time_field: input.time_field.clone(),
        indices: input.indices.clone(),
        feature_attributes: input.features.clone(),
        filter_query: input.filter_query.clone(),
        detection_interval: parse_interval(&input.detection_interval)?,
        window_delay: parse_interval(&input.window_delay)?,
    })
}

/// `{"query": {"match": {"name": <pattern>}}}`
pub fn search_by_name(pattern: &str) -> SearchRequest {
    SearchRequest {
        query: SearchQuery {
            r#match: Match {
                name: pattern.to_string(),
            },
        },
    }
}

/// Text form of a partition value as it appears in entity detector names
pub fn partition_value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `<base>-<value>`
pub fn entity_name(base: &str, value: &Value) -> String {
    format!("{}-{}", base, partition_value_text(value))
}

/// The operator's filter, unless it is `null` or an empty object
///
/// The generated skeleton carries `"filter": {}`, which the service rejects as
/// a query clause.
pub fn effective_filter(filter: Option<&Value>) -> Option<&Value> {
    filter.filter(|value| match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    })
}

/// ANDs the operator's filter with an equality filter on the partition value
pub fn entity_filter(base: Option<&Value>, field: &str, value: &Value) -> Value {
    let term = json!({ "term": { field: value } });
    let must = match effective_filter(base) {
        Some(filter) => vec![filter.clone(), term],
        None => vec![term],
    };
    json!({ "bool": { "must": must } })
}

pub fn decode_created_id(body: &[u8]) -> Result<String, MapperError> {
    let response: CreateResponse =
        serde_json::from_slice(body).map_err(|source| MapperError::InvalidResponse {
            what: "create response",
            source,
        })?;
    Ok(response.id)
}

/// Matches of a by-name search; a response without hits is an empty list
pub fn decode_search_hits(body: &[u8]) -> Result<Vec<DetectorSummary>, MapperError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|source| MapperError::InvalidResponse {
            what: "search response",
            source,
        })?;

    Ok(response
        .hits
        .map(|hits| hits.hits)
        .unwrap_or_default()
        .into_iter()
        .map(|hit| DetectorSummary {
            id: hit.id,
            name: hit.source.map(|source| source.name).unwrap_or_default(),
        })
        .collect())
}

pub fn decode_detector(body: &[u8]) -> Result<DetectorOutput, MapperError> {
    let document: DetectorDocument =
        serde_json::from_slice(body).map_err(|source| MapperError::InvalidResponse {
            what: "detector",
            source,
        })?;
    detector_output(document)
}

pub fn detector_output(document: DetectorDocument) -> Result<DetectorOutput, MapperError> {
    let detector = document.anomaly_detector;
    Ok(DetectorOutput {
        id: document.id,
        name: detector.name,
        description: detector.description,
        time_field: detector.time_field,
        indices: detector.indices,
        features: detector.feature_attributes,
        filter_query: detector.filter_query,
        detection_interval: format_interval(&detector.detection_interval)?,
        window_delay: format_interval(&detector.window_delay)?,
        last_update_time: detector.last_update_time,
        schema_version: detector.schema_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FeatureRequest;

    fn feature(aggregation: &[&str], field: &[&str]) -> FeatureRequest {
        FeatureRequest {
            aggregation_type: aggregation.iter().map(|s| s.to_string()).collect(),
            enabled: true,
            field: field.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn request() -> DetectorRequest {
        DetectorRequest {
            name: "testdata-detector".to_string(),
            description: "Test detector".to_string(),
            time_field: "timestamp".to_string(),
            index: vec!["order*".to_string()],
            features: vec![feature(&["sum"], &["value"])],
            filter: Some(json!({"bool": {"filter": [{"exists": {"field": "value"}}]}})),
            interval: "1m".to_string(),
            delay: "1m".to_string(),
            start: true,
            partition_field: Some("ip".to_string()),
        }
    }

    #[test]
    fn test_feature_name_and_query() {
        let feature = feature_from_request(&feature(&["sum"], &["value"]), 0).unwrap();
        assert_eq!(feature.name, "value_sum");
        assert!(feature.enabled);
        assert_eq!(
            feature.aggregation_query,
            json!({"value_sum": {"sum": {"field": "value"}}})
        );
    }

    #[test]
    fn test_feature_uses_first_pair_only() {
        let feature =
            feature_from_request(&feature(&["max", "min"], &["latency", "bytes"]), 0).unwrap();
        assert_eq!(feature.name, "latency_max");
    }

    #[test]
    fn test_feature_without_field_is_rejected() {
        let err = feature_from_request(&feature(&["count"], &[]), 2).unwrap_err();
        assert!(matches!(err, MapperError::IncompleteFeature { position: 2 }));
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1m").unwrap(), Interval::minutes(1));
        assert_eq!(parse_interval("10m").unwrap(), Interval::minutes(10));
        assert_eq!(parse_interval("2h").unwrap(), Interval::minutes(120));
        assert_eq!(parse_interval("1d").unwrap(), Interval::minutes(1440));
        assert_eq!(parse_interval(" 5m ").unwrap(), Interval::minutes(5));
    }

    #[test]
    fn test_parse_interval_rejects_malformed_text() {
        for text in ["", "m", "10", "10s", "0m", "-1m", "1.5m"] {
            assert!(parse_interval(text).is_err(), "{} should be rejected", text);
        }
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(&Interval::minutes(5)).unwrap(), "5m");
        let unknown = Interval {
            period: crate::entity::Period {
                duration: 5,
                unit: "Fortnights".to_string(),
            },
        };
        assert!(matches!(
            format_interval(&unknown),
            Err(MapperError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn test_create_payload() {
        let payload = create_payload(&request()).unwrap();
        assert_eq!(payload.name, "testdata-detector");
        assert_eq!(payload.indices, vec!["order*".to_string()]);
        assert_eq!(payload.feature_attributes.len(), 1);
        assert_eq!(payload.feature_attributes[0].name, "value_sum");
        assert_eq!(payload.detection_interval, Interval::minutes(1));
        assert_eq!(payload.window_delay, Interval::minutes(1));
        assert_eq!(payload.filter_query, request().filter);
    }

    #[test]
    fn test_create_payload_rejects_bad_interval() {
        let mut request = request();
        request.interval = "soon".to_string();
        assert!(matches!(
            create_payload(&request),
            Err(MapperError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_search_by_name() {
        assert_eq!(
            serde_json::to_value(search_by_name("detector*")).unwrap(),
            json!({"query": {"match": {"name": "detector*"}}})
        );
    }

    #[test]
    fn test_entity_filter_wraps_base_filter() {
        let base = json!({"bool": {"filter": [{"exists": {"field": "value"}}]}});
        let filter = entity_filter(Some(&base), "ip", &json!("localhost"));
        assert_eq!(
            filter,
            json!({"bool": {"must": [base, {"term": {"ip": "localhost"}}]}})
        );
    }

    #[test]
    fn test_entity_filter_without_base_filter() {
        let filter = entity_filter(None, "ip", &json!("localhost"));
        assert_eq!(
            filter,
            json!({"bool": {"must": [{"term": {"ip": "localhost"}}]}})
        );
    }

    #[test]
    fn test_empty_filter_is_no_filter() {
        let empty = json!({});
        let filter = entity_filter(Some(&empty), "ip", &json!("localhost"));
        assert_eq!(
            filter,
            json!({"bool": {"must": [{"term": {"ip": "localhost"}}]}})
        );

        let mut request = request();
        request.filter = Some(empty);
        assert!(create_payload(&request).unwrap().filter_query.is_none());
        assert!(effective_filter(Some(&Value::Null)).is_none());
    }

    #[test]
    fn test_entity_name() {
        assert_eq!(entity_name("orders", &json!("localhost")), "orders-localhost");
        assert_eq!(entity_name("orders", &json!(42)), "orders-42");
        assert_eq!(entity_name("orders", &json!(true)), "orders-true");
    }

    #[test]
    fn test_decode_created_id() {
        let body = br#"{"_id": "m4ccEnIBTXsGi3mvMt9p", "_version": 1, "anomaly_detector": {}}"#;
        assert_eq!(decode_created_id(body).unwrap(), "m4ccEnIBTXsGi3mvMt9p");
        assert!(decode_created_id(b"not json").is_err());
    }

    #[test]
    fn test_decode_search_hits() {
        let body = br#"{"hits": {"total": {"value": 2}, "hits": [
            {"_id": "a", "_source": {"name": "orders-1"}},
            {"_id": "b", "_source": {"name": "orders-2"}}
        ]}}"#;
        let hits = decode_search_hits(body).unwrap();
        assert_eq!(
            hits,
            vec![
                DetectorSummary {
                    id: "a".to_string(),
                    name: "orders-1".to_string()
                },
                DetectorSummary {
                    id: "b".to_string(),
                    name: "orders-2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_decode_search_without_hits_is_empty() {
        assert!(decode_search_hits(b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_decode_detector() {
        let body = br#"{
            "_id": "detectorID",
            "_version": 1,
            "anomaly_detector": {
                "name": "detector",
                "description": "Test detector",
                "time_field": "timestamp",
                "indices": ["order*"],
                "filter_query": {"match_all": {}},
                "detection_interval": {"period": {"interval": 5, "unit": "Minutes"}},
                "window_delay": {"period": {"interval": 1, "unit": "Minutes"}},
                "schema_version": 0,
                "feature_attributes": [{
                    "feature_id": "f1",
                    "feature_name": "total_order",
                    "feature_enabled": true,
                    "aggregation_query": {"total_order": {"sum": {"field": "value"}}}
                }],
                "last_update_time": 1589441737319
            }
        }"#;

        let detector = decode_detector(body).unwrap();
        assert_eq!(detector.id, "detectorID");
        assert_eq!(detector.detection_interval, "5m");
        assert_eq!(detector.window_delay, "1m");
        assert_eq!(detector.last_update_time, 1589441737319);
        assert_eq!(detector.features[0].name, "total_order");
    }

    #[test]
    fn test_update_payload_round_trips_get_output() {
        let input = UpdateDetectorUserInput {
            id: "id".to_string(),
            name: "test-detector".to_string(),
            description: "Test detector".to_string(),
            time_field: "timestamp".to_string(),
            indices: vec!["order*".to_string()],
            features: Vec::new(),
            filter_query: None,
            detection_interval: "5m".to_string(),
            window_delay: "1m".to_string(),
            last_update_time: 1,
            schema_version: 0,
        };
        let payload = update_payload(&input).unwrap();
        assert_eq!(payload.detection_interval, Interval::minutes(5));
        assert_eq!(payload.window_delay, Interval::minutes(1));
        assert!(payload.filter_query.is_none());
    }
}
