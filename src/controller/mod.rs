//! Detector lifecycle orchestration
//!
//! [`DetectorController`] validates input, asks for confirmation where the
//! operator should have a say, and drives the remote gateway one call at a
//! time. It owns a [`CancellationToken`]; every gateway and platform call
//! races against it, and a cancelled operation stops where it is without
//! attempting any cleanup.

pub mod batch;
pub mod prompt;

pub use batch::{BatchAction, BatchReport, FailedMatch};
pub use prompt::Confirmation;

use crate::entity::{
    CreatedDetector, DetectorOutput, DetectorPayload, DetectorRequest, DetectorSummary,
    UpdateDetectorUserInput,
};
use crate::gateway::{DetectorGateway, GatewayError};
use crate::mapper::{self, MapperError};
use crate::platform::{PlatformController, PlatformError};
use std::future::Future;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("detector Id cannot be empty")]
    EmptyDetectorId,

    #[error("name cannot be empty")]
    EmptyName,

    #[error("detector '{0}' has no index configured")]
    MissingIndex(String),

    #[error("failed to get values for partition field: {field}, check whether any data is available in index [{index}]")]
    NoPartitionValues { field: String, index: String },

    #[error("detector is created with id: {id}, but failed to start due to {cause}")]
    CreatedButNotStarted { id: String, cause: GatewayError },

    #[error("new version for detector is available. Please fetch latest version and then merge your changes")]
    StaleDetector { expected: i64, actual: i64 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to read confirmation: {0}")]
    Prompt(#[from] io::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}

/// Result of an operation guarded by a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The operator said no; nothing was changed
    Declined,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

pub struct DetectorController {
    gateway: Arc<dyn DetectorGateway>,
    platform: Arc<dyn PlatformController>,
    prompt: Confirmation,
    cancel: CancellationToken,
}

impl DetectorController {
    pub fn new(
        prompt: Confirmation,
        platform: Arc<dyn PlatformController>,
        gateway: Arc<dyn DetectorGateway>,
    ) -> Self {
        Self {
            gateway,
            platform,
            prompt,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs one collaborator call, giving up as soon as the token fires
    async fn guard<T, E, F>(&self, call: F) -> Result<T, ControllerError>
    where
        F: Future<Output = Result<T, E>>,
        ControllerError: From<E>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ControllerError::Cancelled),
            result = call => result.map_err(ControllerError::from),
        }
    }

    fn confirm(&self, interactive: bool, message: &str) -> Result<bool, ControllerError> {
        if self.cancel.is_cancelled() {
            return Err(ControllerError::Cancelled);
        }
        Ok(self.prompt.confirm(interactive, message)?)
    }

    pub async fn start_detector(&self, id: &str) -> Result<(), ControllerError> {
        require_id(id)?;
        self.guard(self.gateway.start_detector(id)).await?;
        info!(detector_id = id, "Started detector");
        Ok(())
    }

    /// Returns the status message reported by the service, if any
    pub async fn stop_detector(&self, id: &str) -> Result<Option<String>, ControllerError> {
        require_id(id)?;
        let status = self.guard(self.gateway.stop_detector(id)).await?;
        match &status {
            Some(message) => info!(detector_id = id, status = %message, "Stopped detector"),
            None => info!(detector_id = id, "Stopped detector"),
        }
        Ok(status)
    }

    pub async fn delete_detector(
        &self,
        id: &str,
        interactive: bool,
        force: bool,
    ) -> Result<Outcome, ControllerError> {
        require_id(id)?;
        let question = format!("Detector {} will be deleted. Do you want to proceed?", id);
        if !self.confirm(interactive, &question)? {
            return Ok(Outcome::Declined);
        }
        self.remove_detector(id, force).await?;
        Ok(Outcome::Applied)
    }

    async fn remove_detector(&self, id: &str, force: bool) -> Result<(), ControllerError> {
        if force {
            self.stop_detector(id).await?;
        }
        self.guard(self.gateway.delete_detector(id)).await?;
        info!(detector_id = id, "Deleted detector");
        Ok(())
    }

    /// Creates one detector and returns its id
    pub async fn create_detector(&self, request: &DetectorRequest) -> Result<String, ControllerError> {
        let payload = mapper::create_payload(request)?;
        self.create_from_payload(&payload, request.start).await
    }

    async fn create_from_payload(
        &self,
        payload: &DetectorPayload,
        start: bool,
    ) -> Result<String, ControllerError> {
        let body = self.guard(self.gateway.create_detector(payload)).await?;
        let id = mapper::decode_created_id(&body)?;
        info!(detector_id = %id, name = %payload.name, "Created detector");

        if start {
            match self.guard(self.gateway.start_detector(&id)).await {
                Ok(()) => info!(detector_id = %id, "Started detector"),
                Err(ControllerError::Gateway(cause)) => {
                    return Err(ControllerError::CreatedButNotStarted { id, cause })
                }
                Err(err) => return Err(err),
            }
        }
        Ok(id)
    }

    /// Creates one detector per distinct value of the partition field
    ///
    /// Without a partition field this is a single create. The batch is
    /// all-or-nothing: the first failure removes every detector this call
    /// already created, then returns that failure. Declining the prompt
    /// returns an empty list.
    pub async fn create_multi_entity_detector(
        &self,
        request: &DetectorRequest,
        interactive: bool,
    ) -> Result<Vec<CreatedDetector>, ControllerError> {
        let Some(field) = request.partition_field() else {
            let id = self.create_detector(request).await?;
            return Ok(vec![CreatedDetector {
                id,
                name: request.name.clone(),
            }]);
        };

        let index = request
            .index
            .first()
            .ok_or_else(|| ControllerError::MissingIndex(request.name.clone()))?;
        let template = mapper::create_payload(request)?;

        let values = self
            .guard(self.platform.get_distinct_values(index, field))
            .await?;
        if values.is_empty() {
            return Err(ControllerError::NoPartitionValues {
                field: field.to_string(),
                index: index.clone(),
            });
        }
        debug!(field, index = %index, count = values.len(), "Resolved partition values");

        let question = format!(
            "{} detectors will be created, one per value of '{}'. Do you want to proceed?",
            values.len(),
            field
        );
        if !self.confirm(interactive, &question)? {
            return Ok(Vec::new());
        }

        let mut created: Vec<CreatedDetector> = Vec::with_capacity(values.len());
        for value in &values {
            let mut payload = template.clone();
            payload.name = mapper::entity_name(&request.name, value);
            payload.filter_query = Some(mapper::entity_filter(
                request.filter.as_ref(),
                field,
                value,
            ));

            match self.create_from_payload(&payload, request.start).await {
                Ok(id) => created.push(CreatedDetector {
                    id,
                    name: payload.name,
                }),
                Err(ControllerError::Cancelled) => return Err(ControllerError::Cancelled),
                Err(err) => {
                    self.rollback(&created).await;
                    return Err(err);
                }
            }
        }
        Ok(created)
    }

    /// Stops then deletes each detector in creation order; failures are logged
    async fn rollback(&self, created: &[CreatedDetector]) {
        for detector in created {
            let id = detector.id.as_str();
            match self.guard(self.gateway.stop_detector(id)).await {
                Err(ControllerError::Cancelled) => {
                    warn!(detector_id = id, "Rollback interrupted by cancellation");
                    return;
                }
                Err(err) => warn!(detector_id = id, error = %err, "Failed to stop detector during rollback"),
                Ok(_) => {}
            }
            match self.guard(self.gateway.delete_detector(id)).await {
                Err(ControllerError::Cancelled) => {
                    warn!(detector_id = id, "Rollback interrupted by cancellation");
                    return;
                }
                Err(err) => warn!(detector_id = id, error = %err, "Failed to delete detector during rollback"),
                Ok(()) => info!(detector_id = id, name = %detector.name, "Rolled back detector"),
            }
        }
    }

    pub async fn get_detector(&self, id: &str) -> Result<DetectorOutput, ControllerError> {
        require_id(id)?;
        let body = self.guard(self.gateway.get_detector(id)).await?;
        Ok(mapper::decode_detector(&body)?)
    }

    /// Detectors whose name matches `pattern`; no match is an empty list
    pub async fn search_detectors(
        &self,
        pattern: &str,
    ) -> Result<Vec<DetectorSummary>, ControllerError> {
        require_name(pattern)?;
        let request = mapper::search_by_name(pattern);
        let body = self.guard(self.gateway.search_detector(&request)).await?;
        let matches = mapper::decode_search_hits(&body)?;
        debug!(pattern, count = matches.len(), "Searched detectors");
        Ok(matches)
    }

    pub async fn get_detectors_by_name(
        &self,
        pattern: &str,
    ) -> Result<Vec<DetectorOutput>, ControllerError> {
        let matches = self.search_detectors(pattern).await?;
        let mut detectors = Vec::with_capacity(matches.len());
        for detector in &matches {
            detectors.push(self.get_detector(&detector.id).await?);
        }
        Ok(detectors)
    }

    pub async fn start_detectors_by_name(
        &self,
        pattern: &str,
        interactive: bool,
    ) -> Result<BatchReport, ControllerError> {
        self.run_batch(BatchAction::Start, pattern, interactive, false)
            .await
    }

    pub async fn stop_detectors_by_name(
        &self,
        pattern: &str,
        interactive: bool,
    ) -> Result<BatchReport, ControllerError> {
        self.run_batch(BatchAction::Stop, pattern, interactive, false)
            .await
    }

    pub async fn delete_detectors_by_name(
        &self,
        pattern: &str,
        force: bool,
        interactive: bool,
    ) -> Result<BatchReport, ControllerError> {
        self.run_batch(BatchAction::Delete, pattern, interactive, force)
            .await
    }

    /// Applies `action` to every match, asking once per match
    ///
    /// A per-detector failure is recorded and the batch moves on; only a
    /// failed search, a prompt failure or cancellation aborts it.
    async fn run_batch(
        &self,
        action: BatchAction,
        pattern: &str,
        interactive: bool,
        force: bool,
    ) -> Result<BatchReport, ControllerError> {
        let matches = self.search_detectors(pattern).await?;
        let mut report = BatchReport::new(action);

        for detector in matches {
            let question = format!(
                "Detector {} ({}) will be {}. Do you want to proceed?",
                detector.name,
                detector.id,
                action.past_tense()
            );
            if !self.confirm(interactive, &question)? {
                debug!(detector_id = %detector.id, %action, "Skipped by operator");
                report.skipped.push(detector);
                continue;
            }

            let result = match action {
                BatchAction::Start => self.start_detector(&detector.id).await,
                BatchAction::Stop => self.stop_detector(&detector.id).await.map(|_| ()),
                BatchAction::Delete => self.remove_detector(&detector.id, force).await,
            };

            match result {
                Ok(()) => report.succeeded.push(detector),
                Err(ControllerError::Cancelled) => return Err(ControllerError::Cancelled),
                Err(err) => {
                    warn!(detector_id = %detector.id, %action, error = %err, "Detector operation failed");
                    report.failed.push(FailedMatch {
                        detector,
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Replaces a detector's definition, guarding against concurrent edits
    ///
    /// Unless `force` is set, the stored detector is fetched first and the
    /// update is refused if it changed after the operator's copy was taken.
    /// With `start`, the detector is stopped before the update and started
    /// again afterwards.
    pub async fn update_detector(
        &self,
        input: &UpdateDetectorUserInput,
        force: bool,
        start: bool,
    ) -> Result<Outcome, ControllerError> {
        require_id(&input.id)?;
        let payload = mapper::update_payload(input)?;

        if !force {
            let latest = self.get_detector(&input.id).await?;
            if latest.last_update_time > input.last_update_time {
                return Err(ControllerError::StaleDetector {
                    expected: input.last_update_time,
                    actual: latest.last_update_time,
                });
            }
            let question = format!(
                "Detector {} will be updated. Do you want to proceed?",
                input.id
            );
            if !self.confirm(true, &question)? {
                return Ok(Outcome::Declined);
            }
        }

        if start {
            self.stop_detector(&input.id).await?;
        }
        self.guard(self.gateway.update_detector(&input.id, &payload))
            .await?;
        info!(detector_id = %input.id, "Updated detector");
        if start {
            self.start_detector(&input.id).await?;
        }
        Ok(Outcome::Applied)
    }
}

impl std::fmt::Debug for DetectorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorController")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

fn require_id(id: &str) -> Result<(), ControllerError> {
    if id.trim().is_empty() {
        return Err(ControllerError::EmptyDetectorId);
    }
    Ok(())
}

fn require_name(name: &str) -> Result<(), ControllerError> {
    if name.trim().is_empty() {
        return Err(ControllerError::EmptyName);
    }
    Ok(())
}
