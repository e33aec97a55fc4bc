//! Per-match outcome of a by-name lifecycle operation

use crate::entity::DetectorSummary;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    Start,
    Stop,
    Delete,
}

impl BatchAction {
    /// Past tense used in summaries
    pub fn past_tense(&self) -> &'static str {
        match self {
            BatchAction::Start => "started",
            BatchAction::Stop => "stopped",
            BatchAction::Delete => "deleted",
        }
    }
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            BatchAction::Start => "start",
            BatchAction::Stop => "stop",
            BatchAction::Delete => "delete",
        };
        write!(f, "{}", verb)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMatch {
    pub detector: DetectorSummary,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub action: BatchAction,
    pub succeeded: Vec<DetectorSummary>,
    /// Matches the operator declined at the prompt
    pub skipped: Vec<DetectorSummary>,
    pub failed: Vec<FailedMatch>,
}

impl BatchReport {
    pub fn new(action: BatchAction) -> Self {
        Self {
            action,
            succeeded: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failed.len()
    }

    /// No detector matched the pattern
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
