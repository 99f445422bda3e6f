//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ingest::SessionClock;

/// Prefix for environment overrides, e.g. `MATCH_TRACKER__SERVER__PORT`.
pub const ENV_PREFIX: &str = "MATCH_TRACKER";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to load config: {0}")]
    LoadError(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Directory with the dashboard front end, served at `/`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Take the client address from `X-Forwarded-For` / `CF-Connecting-IP`.
    /// Only enable behind a reverse proxy that sets these headers.
    #[serde(default)]
    pub trust_proxy: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            static_dir: None,
            trust_proxy: false,
        }
    }
}

/// Rules for recording new matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Client IPs allowed to add matches
    #[serde(default)]
    pub allow_adds_from: Vec<String>,

    /// Hours subtracted from UTC to get local time
    #[serde(default)]
    pub timezone_offset_hours: i32,

    /// Matches up to this local hour count for the previous day
    #[serde(default = "default_rollover_hour")]
    pub session_rollover_hour: u32,
}

fn default_rollover_hour() -> u32 {
    3
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allow_adds_from: Vec::new(),
            timezone_offset_hours: 0,
            session_rollover_hour: default_rollover_hour(),
        }
    }
}

impl IngestConfig {
    pub fn allows(&self, ip: &str) -> bool {
        self.allow_adds_from.iter().any(|allowed| allowed == ip)
    }

    pub fn session_clock(&self) -> SessionClock {
        SessionClock::new(self.timezone_offset_hours, self.session_rollover_hour)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ingest: IngestConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply
    /// `MATCH_TRACKER__*` environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`AppConfig::load`], reading overrides from `env` instead of the
    /// process environment when it is given.
    pub fn load_with_env(
        path: &Path,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.to_path_buf()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("ingest.allow_adds_from")
                    .source(env),
            )
            .build()?;
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML, e.g. to seed a config file.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.ingest.session_rollover_hour > 23 {
            return Err(ConfigError::ValidationError(
                "Session rollover hour must be between 0 and 23".to_string(),
            ));
        }

        if self.ingest.timezone_offset_hours.abs() > 14 {
            return Err(ConfigError::ValidationError(
                "Timezone offset must be within 14 hours of UTC".to_string(),
            ));
        }

        Ok(())
    }
}
