//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the MNEE API gateway.
//! Configuration includes the listener address, the MNEE environment and API key,
//! CORS settings, and ticket polling timings.

use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "MNEE_API_CONFIG_PATH";

/// Config file read when `MNEE_API_CONFIG_PATH` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/mnee-api.toml";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all gateway settings.
///
/// Keys match the lowercased environment variable names (`PORT` -> `port`),
/// so the same key works in the TOML file and in the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Listener port
    #[serde(default = "default_port")]
    pub port: String,
    /// "production" selects the production MNEE API; anything else is sandbox
    #[serde(default = "default_mnee_env")]
    pub mnee_env: String,
    /// MNEE API key (required at startup)
    #[serde(default)]
    pub mnee_api_key: String,
    /// Listener host
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Comma-separated allowed CORS origins ("*" allows any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// Overrides the MNEE API base URL of the selected environment
    #[serde(default)]
    pub mnee_api_url: Option<String>,
    /// Interval between ticket status checks
    #[serde(default = "default_ticket_poll_interval_ms")]
    pub ticket_poll_interval_ms: u64,
    /// Upper bound on a single ticket poll
    #[serde(default = "default_ticket_poll_timeout_ms")]
    pub ticket_poll_timeout_ms: u64,
}

fn default_port() -> String {
    "8080".to_string()
}

fn default_mnee_env() -> String {
    "sandbox".to_string()
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_cors_origins() -> String {
    "*".to_string()
}

fn default_ticket_poll_interval_ms() -> u64 {
    2000
}

fn default_ticket_poll_timeout_ms() -> u64 {
    60000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            mnee_env: default_mnee_env(),
            mnee_api_key: String::new(),
            api_host: default_api_host(),
            cors_origins: default_cors_origins(),
            mnee_api_url: None,
            ticket_poll_interval_ms: default_ticket_poll_interval_ms(),
            ticket_poll_timeout_ms: default_ticket_poll_timeout_ms(),
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

impl Config {
    /// Loads configuration from the optional TOML file and the environment.
    ///
    /// Environment variables override file values. This never fails: an
    /// unreadable file is skipped in favour of the environment alone, and a
    /// key whose value cannot be parsed keeps its default with a warning.
    pub fn load() -> Self {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        match Self::from_sources(&path, config::Environment::default()) {
            Ok(config) => {
                info!("Configuration loaded (file: {}, env: {})", path, config.mnee_env);
                config
            }
            Err(e) => {
                warn!("Ignoring configuration file, using environment only: {:#}", e);
                Self::from_env(config::Environment::default())
            }
        }
    }

    /// Layers `env` over the TOML file at `path`. A missing file is not an error.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the TOML file
    /// * `env` - Environment source, highest priority
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Merged configuration
    /// * `Err(anyhow::Error)` - The file exists but could not be parsed
    pub fn from_sources(path: &str, env: config::Environment) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read configuration sources ({})", path))?;

        Ok(Self::from_settings(&settings))
    }

    /// Reads configuration from `env` alone.
    pub fn from_env(env: config::Environment) -> Self {
        match config::Config::builder().add_source(env).build() {
            Ok(settings) => Self::from_settings(&settings),
            Err(e) => {
                warn!("Failed to read environment, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Extracts every key on its own so one bad value cannot discard the rest.
    fn from_settings(settings: &config::Config) -> Self {
        let defaults = Self::default();
        Self {
            port: setting(settings, "port", defaults.port),
            mnee_env: setting(settings, "mnee_env", defaults.mnee_env),
            mnee_api_key: setting(settings, "mnee_api_key", defaults.mnee_api_key),
            api_host: setting(settings, "api_host", defaults.api_host),
            cors_origins: setting(settings, "cors_origins", defaults.cors_origins),
            mnee_api_url: setting(settings, "mnee_api_url", defaults.mnee_api_url),
            ticket_poll_interval_ms: setting(
                settings,
                "ticket_poll_interval_ms",
                defaults.ticket_poll_interval_ms,
            ),
            ticket_poll_timeout_ms: setting(
                settings,
                "ticket_poll_timeout_ms",
                defaults.ticket_poll_timeout_ms,
            ),
        }
    }

    // ------------------------------------------------------------------------
    // Derived settings
    // ------------------------------------------------------------------------

    /// Allowed CORS origins, split and trimmed.
    pub fn cors_origin_list(&self) -> Vec<String> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() {
            vec!["*".to_string()]
        } else {
            origins
        }
    }

    /// MNEE API base URL override, ignoring blank values.
    pub fn api_url_override(&self) -> Option<&str> {
        self.mnee_api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn ticket_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ticket_poll_interval_ms)
    }

    pub fn ticket_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.ticket_poll_timeout_ms)
    }

    /// Listener address as `host:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.port)
    }
}

/// Value of `key`, or `default` when it is unset or cannot be parsed.
fn setting<T: DeserializeOwned>(settings: &config::Config, key: &str, default: T) -> T {
    match settings.get::<T>(key) {
        Ok(value) => value,
        Err(config::ConfigError::NotFound(_)) => default,
        Err(e) => {
            warn!("Invalid value for configuration key {}, using default: {}", key, e);
            default
        }
    }
}
