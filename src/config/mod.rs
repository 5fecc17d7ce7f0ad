//! Configuration module for tagbridge
//!
//! The service is configured from a single TOML file:
//!
//! ```toml
//! [server]
//! endpoint = "opc.tcp://127.0.0.1:49320"
//! channel = "stroi"
//!
//! [http]
//! bind = "127.0.0.1:5000"
//!
//! [logging]
//! filter = "info,tagbridge_rs=debug"
//! directory = "/var/log/tagbridge"
//!
//! [simulation]
//! file = "plant.toml"
//! ```
//!
//! # Config Location
//!
//! Looked up in order:
//! 1. an explicit path (first command-line argument)
//! 2. the `TAGBRIDGE_CONFIG` environment variable
//! 3. `config.toml` in the platform config directory:
//!    - **Linux**: `~/.config/dev.tagbridge.tagbridge-rs/`
//!    - **macOS**: `~/Library/Application Support/dev.tagbridge.tagbridge-rs/`
//!    - **Windows**: `%APPDATA%\dev.tagbridge.tagbridge-rs\`
//!
//! Without any file the built-in defaults are used. `TAGBRIDGE_ENDPOINT`,
//! `TAGBRIDGE_CHANNEL` and `TAGBRIDGE_BIND` override the loaded values.

use crate::error::{BridgeError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.tagbridge.tagbridge-rs";

/// Config filename inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "TAGBRIDGE_CONFIG";

/// Default OPC UA endpoint of the reference deployment
pub const DEFAULT_ENDPOINT: &str = "opc.tcp://127.0.0.1:49320";

/// Default channel of interest
pub const DEFAULT_CHANNEL: &str = "stroi";

/// Default HTTP listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

// ==================== Config Directory ====================

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path of the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Sections ====================

/// Remote address-space server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Endpoint URL of the OPC UA server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Top-level channel exposed by `/structure` (matched case-insensitively)
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Application name announced to the server
    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Connect attempts the client makes before giving up
    #[serde(default = "default_session_retry_limit")]
    pub session_retry_limit: i32,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

fn default_application_name() -> String {
    "tagbridge-rs".to_string()
}

fn default_session_retry_limit() -> i32 {
    3
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            channel: default_channel(),
            application_name: default_application_name(),
            session_retry_limit: default_session_retry_limit(),
        }
    }
}

/// HTTP listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Directory for a daily rolling log file; stdout only when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// File name prefix of the rolling log
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_filter() -> String {
    "info,tagbridge_rs=debug".to_string()
}

fn default_file_prefix() -> String {
    "tagbridge.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

/// Simulated address space instead of a live server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulation file; relative paths resolve against the config file
    pub file: PathBuf,
}

// ==================== App Config ====================

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
}

impl AppConfig {
    /// Parse a config document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; a relative simulation path is resolved against it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(BridgeError::from)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        if let (Some(sim), Some(base)) = (config.simulation.as_mut(), path.parent()) {
            if sim.file.is_relative() {
                sim.file = base.join(&sim.file);
            }
        }
        Ok(config)
    }

    /// Pick the config file to use, if any
    pub fn locate(explicit: Option<PathBuf>) -> Option<PathBuf> {
        if explicit.is_some() {
            return explicit;
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        default_config_path().filter(|p| p.exists())
    }

    /// Locate and load the config, then apply environment overrides.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an error.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let mut config = match Self::locate(explicit) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TAGBRIDGE_ENDPOINT`, `TAGBRIDGE_CHANNEL` and `TAGBRIDGE_BIND`
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(endpoint) = std::env::var("TAGBRIDGE_ENDPOINT") {
            self.server.endpoint = endpoint;
        }
        if let Ok(channel) = std::env::var("TAGBRIDGE_CHANNEL") {
            self.server.channel = channel;
        }
        if let Ok(bind) = std::env::var("TAGBRIDGE_BIND") {
            self.http.bind = bind.parse().map_err(|e| {
                BridgeError::Config(format!("invalid TAGBRIDGE_BIND '{}': {}", bind, e))
            })?;
        }
        Ok(())
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.channel.trim().is_empty() {
            return Err(BridgeError::Config("server.channel must not be empty".into()));
        }
        if self.server.endpoint.trim().is_empty() {
            return Err(BridgeError::Config("server.endpoint must not be empty".into()));
        }
        Ok(())
    }
}
