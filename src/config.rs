//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "strictly_games.toml";

/// Configuration for the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to (0 picks a free port).
    #[serde(default = "default_port")]
    port: u16,

    /// Frames buffered per connection before outbound frames are dropped.
    #[serde(default = "default_max_send_queue")]
    max_send_queue: usize,

    /// Tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    3000
}

#[instrument]
fn default_max_send_queue() -> usize {
    256
}

#[instrument]
fn default_log_filter() -> String {
    "info,strictly_games=debug".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_send_queue: default_max_send_queue(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.max_send_queue == 0 {
            return Err(ConfigError::new("max_send_queue must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Resolves the configuration to run with.
    ///
    /// An explicit `path` must exist. Without one, `DEFAULT_CONFIG_FILE` is
    /// read when present and defaults are used otherwise.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }

    /// Socket address string `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
