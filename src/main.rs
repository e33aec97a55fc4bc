use adctl::cli::commands::CliArgs;
use adctl::cli::handlers::{build_controller, run_command};
use adctl::config::{AdctlConfig, ConfigOverrides};
use adctl::util::logging::{self, LoggingConfig};
use adctl::VERSION;

use clap::Parser;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let overrides = ConfigOverrides {
        profile: args.profile.clone(),
        endpoint: args.endpoint.clone(),
        log_level: args.log_level.clone(),
    };
    let config = match AdctlConfig::load(&overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging_from_args(&args, &config);

    debug!("adctl v{} starting", VERSION);
    debug!("Arguments: {:?}", args);
    debug!(profile = %config.profile, endpoint = %config.endpoint, "Resolved configuration");

    let exit_code = run(&args, &config).await;
    std::process::exit(exit_code);
}

async fn run(args: &CliArgs, config: &AdctlConfig) -> i32 {
    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let controller = match build_controller(config, cancel) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run_command(&args.command, &controller, &mut out).await;
    let _ = out.flush();

    match result {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

/// First Ctrl-C cancels the running operation; a second one exits at once
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupted, cancelling the current operation");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}

fn init_logging_from_args(args: &CliArgs, config: &AdctlConfig) {
    let logging_config = LoggingConfig::resolve(
        &config.log_level,
        args.log_level.is_some(),
        args.verbose,
        args.quiet,
    );
    logging::init_logging(logging_config.json(logging::json_from_env()));
}
