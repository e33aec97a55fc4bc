//! Command handlers
//!
//! Each handler drives the [`DetectorController`] for one subcommand and
//! writes its result to the given writer. Prompts go through the
//! controller's own confirmation streams.

use super::commands::{Commands, CreateArgs, DeleteArgs, GetArgs, TargetArgs, UpdateArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::AdctlConfig;
use crate::controller::{Confirmation, DetectorController, Outcome};
use crate::entity::{DetectorRequest, UpdateDetectorUserInput};
use crate::gateway::{HttpGateway, RestClient};
use crate::platform::HttpPlatform;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file name cannot be empty")]
    EmptyName,

    #[error("failed to open file {path} due to {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("file {path} cannot be accepted due to {source}")]
    Rejected {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Whether a command fully succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// The command ran but at least one matched detector failed
    PartialFailure,
}

impl CommandStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandStatus::Success => 0,
            CommandStatus::PartialFailure => 1,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    if path.as_os_str().is_empty() {
        return Err(FileError::EmptyName);
    }
    let display = path.display().to_string();
    let content = std::fs::read(path).map_err(|source| FileError::Open {
        path: display.clone(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| FileError::Rejected {
        path: display,
        source,
    })
}

pub fn read_detector_request(path: &Path) -> Result<DetectorRequest, FileError> {
    read_json(path)
}

pub fn read_update_input(path: &Path) -> Result<UpdateDetectorUserInput, FileError> {
    read_json(path)
}

/// Wires the HTTP collaborators and stdio prompt into a controller
pub fn build_controller(
    config: &AdctlConfig,
    cancel: CancellationToken,
) -> Result<DetectorController> {
    let client = Arc::new(
        RestClient::new(config.client_settings()).context("Failed to create HTTP client")?,
    );
    let gateway = Arc::new(HttpGateway::new(client.clone()));
    let platform = Arc::new(HttpPlatform::new(client));

    Ok(DetectorController::new(Confirmation::stdio(), platform, gateway).with_cancellation(cancel))
}

pub async fn run_command(
    command: &Commands,
    controller: &DetectorController,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    match command {
        Commands::Create(args) => handle_create(controller, args, out).await,
        Commands::Generate => handle_generate(out),
        Commands::Get(args) => handle_get(controller, args, out).await,
        Commands::Start(args) => handle_start(controller, args, out).await,
        Commands::Stop(args) => handle_stop(controller, args, out).await,
        Commands::Delete(args) => handle_delete(controller, args, out).await,
        Commands::Update(args) => handle_update(controller, args, out).await,
    }
}

pub async fn handle_create(
    controller: &DetectorController,
    args: &CreateArgs,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    let formatter = OutputFormatter::new(OutputFormat::Human);

    for file in &args.files {
        let request = read_detector_request(file)?;
        debug!(file = %file.display(), name = %request.name, "Creating from definition");

        let created = controller
            .create_multi_entity_detector(&request, true)
            .await?;
        if created.is_empty() {
            writeln!(out, "Create cancelled")?;
            continue;
        }
        write!(out, "{}", formatter.format_created(&created))?;
    }
    Ok(CommandStatus::Success)
}

pub fn handle_generate(out: &mut dyn Write) -> Result<CommandStatus> {
    let formatter = OutputFormatter::new(OutputFormat::Json);
    writeln!(out, "{}", formatter.format_skeleton(&DetectorRequest::skeleton())?)?;
    Ok(CommandStatus::Success)
}

pub async fn handle_get(
    controller: &DetectorController,
    args: &GetArgs,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    let detectors = if args.target.id {
        vec![controller.get_detector(&args.target.name).await?]
    } else {
        controller.get_detectors_by_name(&args.target.name).await?
    };

    let formatter = OutputFormatter::new(args.format.into());
    writeln!(out, "{}", formatter.format_detectors(&detectors)?.trim_end())?;
    Ok(CommandStatus::Success)
}

pub async fn handle_start(
    controller: &DetectorController,
    args: &TargetArgs,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    if args.id {
        controller.start_detector(&args.name).await?;
        writeln!(out, "Started detector {}", args.name)?;
        return Ok(CommandStatus::Success);
    }

    let report = controller.start_detectors_by_name(&args.name, true).await?;
    write!(out, "{}", OutputFormatter::new(OutputFormat::Human).format_batch(&report, &args.name))?;
    Ok(batch_status(report.has_failures()))
}

pub async fn handle_stop(
    controller: &DetectorController,
    args: &TargetArgs,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    if args.id {
        match controller.stop_detector(&args.name).await? {
            Some(status) => writeln!(out, "Stopped detector {}: {}", args.name, status)?,
            None => writeln!(out, "Stopped detector {}", args.name)?,
        }
        return Ok(CommandStatus::Success);
    }

    let report = controller.stop_detectors_by_name(&args.name, true).await?;
    write!(out, "{}", OutputFormatter::new(OutputFormat::Human).format_batch(&report, &args.name))?;
    Ok(batch_status(report.has_failures()))
}

pub async fn handle_delete(
    controller: &DetectorController,
    args: &DeleteArgs,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    let target = &args.target;
    if target.id {
        match controller
            .delete_detector(&target.name, true, args.force)
            .await?
        {
            Outcome::Applied => writeln!(out, "Deleted detector {}", target.name)?,
            Outcome::Declined => writeln!(out, "Delete cancelled")?,
        }
        return Ok(CommandStatus::Success);
    }

    let report = controller
        .delete_detectors_by_name(&target.name, args.force, true)
        .await?;
    write!(out, "{}", OutputFormatter::new(OutputFormat::Human).format_batch(&report, &target.name))?;
    Ok(batch_status(report.has_failures()))
}

pub async fn handle_update(
    controller: &DetectorController,
    args: &UpdateArgs,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    let input = read_update_input(&args.file)?;

    match controller
        .update_detector(&input, args.force, args.start)
        .await?
    {
        Outcome::Applied => writeln!(out, "Successfully updated detector.")?,
        Outcome::Declined => writeln!(out, "Update cancelled")?,
    }
    Ok(CommandStatus::Success)
}

fn batch_status(has_failures: bool) -> CommandStatus {
    if has_failures {
        CommandStatus::PartialFailure
    } else {
        CommandStatus::Success
    }
}
