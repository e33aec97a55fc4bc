//! Connection and runtime configuration for adctl
//!
//! Settings are resolved from, lowest to highest precedence:
//!
//! 1. Built-in defaults
//! 2. A named profile in the YAML profiles file (`~/.adctl/config.yaml`)
//! 3. Environment variables
//! 4. Command-line flags
//!
//! # Environment Variables
//!
//! - `ADCTL_CONFIG`: Profiles file path - default: `~/.adctl/config.yaml`
//! - `ADCTL_PROFILE`: Profile name - default: "default"
//! - `ADCTL_ENDPOINT`: Cluster URL - default: "http://localhost:9200"
//! - `ADCTL_USERNAME` / `ADCTL_PASSWORD`: Basic auth credentials
//! - `ADCTL_REQUEST_TIMEOUT`: Timeout in seconds - default: "30"
//! - `ADCTL_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Profiles File
//!
//! ```yaml
//! profiles:
//!   default:
//!     endpoint: https://localhost:9200
//!     username: admin
//!     password: admin
//!   staging:
//!     endpoint: https://search.staging:9200
//!     request_timeout_secs: 60
//! ```

use crate::gateway::ClientSettings;
use crate::util::logging::try_parse_level;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_ENDPOINT: &str = "http://localhost:9200";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Profile '{name}' not found in {}", .path.display())]
    UnknownProfile { name: String, path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid profiles file {}: {source}", .path.display())]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One named entry of the profiles file; unset fields fall through
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    profiles: HashMap<String, Profile>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub profile: Option<String>,
    pub endpoint: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdctlConfig {
    pub profile: String,
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for AdctlConfig {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: None,
            password: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AdctlConfig {
    /// Resolves the full precedence chain and validates the result
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let path = Self::profiles_path();
        let config = Self::from_sources(overrides, path.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// `ADCTL_CONFIG`, else `~/.adctl/config.yaml`
    pub fn profiles_path() -> Option<PathBuf> {
        env::var("ADCTL_CONFIG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".adctl").join("config.yaml")))
    }

    /// Resolves settings from an explicit profiles file, env and overrides
    ///
    /// A missing file is fine for the default profile; asking for any other
    /// profile that cannot be found is an error.
    pub fn from_sources(
        overrides: &ConfigOverrides,
        profiles_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let profile_name = overrides
            .profile
            .clone()
            .or_else(|| env::var("ADCTL_PROFILE").ok())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let mut config = Self {
            profile: profile_name.clone(),
            ..Self::default()
        };

        let profiles = match profiles_path {
            Some(path) if path.exists() => read_profiles(path)?,
            _ => ProfilesFile::default(),
        };
        match profiles.profiles.get(&profile_name) {
            Some(profile) => config.apply_profile(profile),
            None if profile_name == DEFAULT_PROFILE => {}
            None => {
                return Err(ConfigError::UnknownProfile {
                    name: profile_name,
                    path: profiles_path.map(Path::to_path_buf).unwrap_or_default(),
                })
            }
        }

        config.apply_env()?;
        config.apply_overrides(overrides);
        Ok(config)
    }

    fn apply_profile(&mut self, profile: &Profile) {
        if let Some(endpoint) = &profile.endpoint {
            self.endpoint = endpoint.clone();
        }
        if profile.username.is_some() {
            self.username = profile.username.clone();
        }
        if profile.password.is_some() {
            self.password = profile.password.clone();
        }
        if let Some(timeout) = profile.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(level) = &profile.log_level {
            self.log_level = level.to_lowercase();
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(endpoint) = env::var("ADCTL_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(username) = env::var("ADCTL_USERNAME") {
            self.username = Some(username);
        }
        if let Ok(password) = env::var("ADCTL_PASSWORD") {
            self.password = Some(password);
        }
        if let Ok(timeout) = env::var("ADCTL_REQUEST_TIMEOUT") {
            self.request_timeout_secs =
                timeout
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::ParseError {
                        field: "ADCTL_REQUEST_TIMEOUT".to_string(),
                        error: e.to_string(),
                    })?;
        }
        if let Ok(level) = env::var("ADCTL_LOG_LEVEL") {
            self.log_level = level.to_lowercase();
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.to_lowercase();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Endpoint cannot be empty".to_string(),
            ));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(format!(
                "Endpoint must start with http:// or https://, got {}",
                endpoint
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if try_parse_level(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn client_settings(&self) -> ClientSettings {
        let settings = ClientSettings::new(self.endpoint.trim())
            .with_timeout(Duration::from_secs(self.request_timeout_secs));
        match &self.username {
            Some(username) => settings.with_credentials(username.clone(), self.password.clone()),
            None => settings,
        }
    }
}

fn read_profiles(path: &Path) -> Result<ProfilesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(ProfilesFile::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::InvalidFile {
        path: path.to_path_buf(),
        source,
    })
}
