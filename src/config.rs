//! Configuration management for BiteBot
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file with CLI overrides. A missing config file
//! is not an error; every field has a sensible default for the local demo
//! stack.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::Cli;
use crate::error::{BitebotError, Result};

/// Main configuration structure for BiteBot
///
/// Holds the backend endpoints and the chat defaults used by the terminal
/// client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoint configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Chat session defaults
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the chat agent service
    #[serde(default = "default_agent_url")]
    pub agent_url: String,

    /// Base URL of the user/auth service
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_agent_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_auth_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            agent_url: default_agent_url(),
            auth_url: default_auth_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Chat session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// User id sent with requests when none is given on the command line
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Show message timestamps in the interactive history view
    #[serde(default)]
    pub show_timestamps: bool,
}

fn default_user_id() -> String {
    "guest".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            show_timestamps: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, applying CLI overrides
    ///
    /// A missing file yields the defaults; a present but malformed file is
    /// an error. The `--server` flag (or `BITEBOT_AGENT_URL`) overrides the
    /// configured agent URL.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML config file
    /// * `cli` - Parsed command-line arguments
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bitebot::cli::Cli;
    /// use bitebot::config::Config;
    ///
    /// # fn example(cli: &Cli) -> bitebot::error::Result<()> {
    /// let config = Config::load("config/config.yaml", cli)?;
    /// config.validate()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&contents).map_err(BitebotError::Yaml)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", path);
            Config::default()
        };

        if let Some(server) = &cli.server {
            tracing::debug!("Overriding agent URL from CLI: {}", server);
            config.api.agent_url = server.clone();
        }

        Ok(config)
    }

    /// Validate the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error when an endpoint is empty or not an HTTP URL, or
    /// when the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        validate_url("api.agent_url", &self.api.agent_url)?;
        validate_url("api.auth_url", &self.api.auth_url)?;

        if self.api.timeout_seconds == 0 {
            return Err(
                BitebotError::Config("api.timeout_seconds must be at least 1".to_string()).into(),
            );
        }
        if self.chat.user_id.trim().is_empty() {
            return Err(BitebotError::Config("chat.user_id must not be empty".to_string()).into());
        }

        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.api.timeout_seconds)
    }
}

/// Check that a configured endpoint looks like an HTTP URL
fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BitebotError::Config(format!("{} must not be empty", field)).into());
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(
            BitebotError::Config(format!("{} must be an http(s) URL: {}", field, value)).into(),
        );
    }
    Ok(())
}
