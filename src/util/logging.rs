//! Structured logging setup for adctl
//!
//! Logs are written to stderr through the `tracing` ecosystem so that command
//! output on stdout stays machine-readable. Filtering honours `RUST_LOG` on
//! top of the configured level.
//!
//! # Example
//!
//! ```no_run
//! use adctl::util::logging;
//!
//! logging::init_from_env();
//!
//! use tracing::{debug, info};
//! info!("Application started");
//! debug!(detector_id = "abc", "Starting detector");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates that are chatty at debug level and pinned to `warn` unless
/// `RUST_LOG` says otherwise
const QUIET_CRATES: &[&str] = &["h2", "hyper", "hyper_util", "reqwest"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for adctl's own events
    pub level: Level,

    /// One JSON object per line instead of human-readable text
    pub use_json: bool,

    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Debug level with targets and locations, for troubleshooting requests
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            use_json: false,
            include_target: true,
            include_location: true,
        }
    }

    /// Picks the level for a command-line run
    ///
    /// `configured` is the resolved configuration level (flag, env, profile
    /// or default). Unless the level was given explicitly on the command line,
    /// `verbose` raises it to debug and `quiet` lowers it to errors only.
    pub fn resolve(configured: &str, explicit: bool, verbose: bool, quiet: bool) -> Self {
        let level = if !explicit && verbose {
            Level::DEBUG
        } else if !explicit && quiet {
            Level::ERROR
        } else {
            parse_level(configured)
        };

        if verbose {
            Self {
                level,
                ..Self::verbose()
            }
        } else {
            Self::with_level(level)
        }
    }

    pub fn json(mut self, use_json: bool) -> Self {
        self.use_json = use_json;
        self
    }
}

/// Parses a level name, case-insensitively
///
/// ```
/// use adctl::util::logging::try_parse_level;
/// use tracing::Level;
///
/// assert_eq!(try_parse_level("DEBUG"), Some(Level::DEBUG));
/// assert_eq!(try_parse_level("loud"), None);
/// ```
pub fn try_parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Like [`try_parse_level`] but falls back to `INFO` with a warning on stderr
pub fn parse_level(level_str: &str) -> Level {
    try_parse_level(level_str).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}

fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("adctl={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    if env::var("RUST_LOG").is_err() {
        for name in QUIET_CRATES {
            if let Ok(directive) = format!("{}=warn", name).parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    filter
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

/// Reads `ADCTL_LOG_LEVEL` and `ADCTL_LOG_JSON`
pub fn config_from_env() -> LoggingConfig {
    let level = env::var("ADCTL_LOG_LEVEL")
        .map(|value| parse_level(&value))
        .unwrap_or(Level::INFO);

    LoggingConfig::with_level(level).json(json_from_env())
}

pub fn json_from_env() -> bool {
    env::var("ADCTL_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

pub fn init_from_env() {
    init_logging(config_from_env());
}
