//! Output formatting for multiple formats
//!
//! Detectors can be rendered as JSON (the same shape `adctl update` reads
//! back), YAML, or a human-readable block per detector. Batch reports and
//! create summaries are always human-readable.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};

use crate::controller::BatchReport;
use crate::entity::{CreatedDetector, DetectorOutput, DetectorRequest};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// A single match is rendered as an object rather than a one-element list
    /// so the JSON output can be edited and fed to `adctl update` directly.
    pub fn format_detectors(&self, detectors: &[DetectorOutput]) -> Result<String> {
        match (self.format, detectors) {
            (OutputFormat::Json, [detector]) => serde_json::to_string_pretty(detector)
                .context("Failed to serialize detector to JSON"),
            (OutputFormat::Json, _) => serde_json::to_string_pretty(detectors)
                .context("Failed to serialize detectors to JSON"),
            (OutputFormat::Yaml, [detector]) => {
                serde_yaml::to_string(detector).context("Failed to serialize detector to YAML")
            }
            (OutputFormat::Yaml, _) => {
                serde_yaml::to_string(detectors).context("Failed to serialize detectors to YAML")
            }
            (OutputFormat::Human, _) => Ok(self.format_detectors_human(detectors)),
        }
    }

    fn format_detectors_human(&self, detectors: &[DetectorOutput]) -> String {
        if detectors.is_empty() {
            return "No detectors found\n".to_string();
        }

        detectors
            .iter()
            .map(format_detector_human)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Create files are JSON, so the skeleton is JSON whatever the format
    pub fn format_skeleton(&self, request: &DetectorRequest) -> Result<String> {
        serde_json::to_string_pretty(request).context("Failed to serialize skeleton to JSON")
    }

    pub fn format_batch(&self, report: &BatchReport, pattern: &str) -> String {
        if report.is_empty() {
            return format!("No detectors match '{}'\n", pattern);
        }

        let mut output = format!(
            "{} {} of {} detector(s) matching '{}'\n",
            capitalize(report.action.past_tense()),
            report.succeeded.len(),
            report.total(),
            pattern
        );
        for detector in &report.succeeded {
            output.push_str(&format!("\u{2713} {} ({})\n", detector.name, detector.id));
        }
        for detector in &report.skipped {
            output.push_str(&format!("- {} ({}) skipped\n", detector.name, detector.id));
        }
        for failure in &report.failed {
            output.push_str(&format!(
                "\u{2717} {} ({}): {}\n",
                failure.detector.name, failure.detector.id, failure.error
            ));
        }
        output
    }

    pub fn format_created(&self, created: &[CreatedDetector]) -> String {
        let mut output = format!("Successfully created {} detector(s)\n", created.len());
        for (i, detector) in created.iter().enumerate() {
            let connector = if i + 1 == created.len() {
                "\u{2514}"
            } else {
                "\u{251C}"
            };
            output.push_str(&format!(
                "{}\u{2500} {} ({})\n",
                connector, detector.name, detector.id
            ));
        }
        output
    }
}

fn format_detector_human(detector: &DetectorOutput) -> String {
    let mut output = String::new();

    output.push_str(&format!("Detector: {} ({})\n", detector.name, detector.id));
    output.push_str(RULE);
    output.push('\n');

    if !detector.description.is_empty() {
        output.push_str(&format!("Description:   {}\n", detector.description));
    }
    output.push_str(&format!("Indices:       {}\n", detector.indices.join(", ")));
    output.push_str(&format!("Time Field:    {}\n", detector.time_field));
    output.push_str(&format!("Interval:      {}\n", detector.detection_interval));
    output.push_str(&format!("Window Delay:  {}\n", detector.window_delay));
    output.push_str(&format!(
        "Last Updated:  {}\n",
        format_timestamp(detector.last_update_time)
    ));

    if detector.features.is_empty() {
        output.push_str("Features:      (none)\n");
    } else {
        output.push_str("Features:\n");
        for (i, feature) in detector.features.iter().enumerate() {
            let connector = if i + 1 == detector.features.len() {
                "\u{2514}"
            } else {
                "\u{251C}"
            };
            let state = if feature.enabled { "enabled" } else { "disabled" };
            output.push_str(&format!(
                "{}\u{2500} {} ({}): {}\n",
                connector, feature.name, state, feature.aggregation_query
            ));
        }
    }

    if let Some(filter) = &detector.filter_query {
        output.push_str(&format!("Filter:        {}\n", filter));
    }

    output
}

/// Epoch milliseconds as a UTC timestamp, or the raw number if out of range
pub fn format_timestamp(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => millis.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
