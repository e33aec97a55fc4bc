//! adctl - lifecycle management for remote anomaly detectors
//!
//! The library drives an OpenSearch-compatible anomaly-detection service:
//! creating detectors (optionally one per distinct value of a partition
//! field, all-or-nothing), starting, stopping and deleting them by id or by
//! name pattern, and updating them with an optimistic-concurrency check.
//!
//! # Core Concepts
//!
//! - **Gateway**: the remote detector API behind [`DetectorGateway`]
//! - **Platform**: distinct-value lookups behind [`PlatformController`]
//! - **Controller**: [`DetectorController`] orchestrates both, asking the
//!   operator for confirmation where a change is destructive
//!
//! # Example Usage
//!
//! ```no_run
//! use adctl::{Confirmation, DetectorController, HttpGateway, HttpPlatform, RestClient};
//! use adctl::gateway::ClientSettings;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(RestClient::new(ClientSettings::new("http://localhost:9200"))?);
//! let controller = DetectorController::new(
//!     Confirmation::stdio(),
//!     Arc::new(HttpPlatform::new(client.clone())),
//!     Arc::new(HttpGateway::new(client)),
//! );
//!
//! let report = controller.stop_detectors_by_name("orders-*", true).await?;
//! println!("stopped {}", report.succeeded.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod entity;
pub mod gateway;
pub mod mapper;
pub mod platform;
pub mod util;

pub use config::{AdctlConfig, ConfigError, ConfigOverrides};
pub use controller::{
    BatchAction, BatchReport, Confirmation, ControllerError, DetectorController, Outcome,
};
pub use gateway::{DetectorGateway, GatewayError, HttpGateway, MockGateway, RestClient};
pub use platform::{HttpPlatform, MockPlatform, PlatformController, PlatformError};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
