//! Data model for detectors and platform lookups

pub mod detector;
pub mod platform;

pub use detector::{
    CreateResponse, CreatedDetector, DetectorDocument, DetectorOutput, DetectorPayload,
    DetectorRequest, DetectorSummary, Feature, FeatureRequest, Interval, Match, Period,
    RemoteDetector, SearchQuery, SearchRequest, SearchResponse, UpdateDetectorUserInput,
    MINUTES_UNIT,
};
pub use platform::{DistinctValuesRequest, DistinctValuesResponse};
