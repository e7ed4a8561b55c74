//! Runtime configuration model.
//!
//! Loaded by the infrastructure config loader from YAML files and
//! `ROTA_`-prefixed environment variables. Every field has a default so
//! partial files work; task records stay raw here and are validated by
//! the domain validator on use.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::domain::errors::RotaResult;
use crate::domain::models::chore::{validate_tasks, Chore};

/// Main configuration structure for rota.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Connection to the smart-home platform's to-do service.
    #[serde(default)]
    pub home_assistant: HomeAssistantConfig,

    /// Daily scheduler tuning.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// On-demand trigger HTTP server.
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,

    /// Raw recurring task records; validated into [`Chore`]s on use.
    #[serde(default)]
    pub tasks: Vec<Value>,
}

impl Config {
    /// Validate the configured task records into chores.
    pub fn chores(&self) -> RotaResult<Vec<Chore>> {
        validate_tasks(&self.tasks)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_assistant: HomeAssistantConfig::default(),
            scheduler: SchedulerConfig::default(),
            trigger: TriggerConfig::default(),
            logging: LogConfig::default(),
            tasks: vec![],
        }
    }
}

/// Connection settings for the Home Assistant REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HomeAssistantConfig {
    /// Base URL of the instance, e.g. `http://homeassistant.local:8123`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Long-lived access token. Usually supplied via
    /// `ROTA_HOME_ASSISTANT__TOKEN` rather than the file.
    #[serde(default)]
    pub token: String,

    /// Request timeout for to-do service calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://homeassistant.local:8123".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Daily scheduler tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// How far past local midnight the session may start and still treat
    /// today's firing as elapsed, triggering one immediate catch-up pass.
    #[serde(default = "default_catch_up_grace_secs")]
    pub catch_up_grace_secs: u64,
}

const fn default_catch_up_grace_secs() -> u64 {
    60
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { catch_up_grace_secs: default_catch_up_grace_secs() }
    }
}

/// On-demand trigger HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TriggerConfig {
    /// Whether to start the trigger server alongside the daemon.
    #[serde(default)]
    pub enabled: bool,

    /// Host to bind to.
    #[serde(default = "default_trigger_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_trigger_port")]
    pub port: u16,

    /// Whether to enable permissive CORS (for dashboard embedding).
    #[serde(default)]
    pub enable_cors: bool,
}

fn default_trigger_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_trigger_port() -> u16 {
    8126
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_trigger_host(),
            port: default_trigger_port(),
            enable_cors: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty).
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for log files (optional, if None logs only to stdout).
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Enable stdout logging.
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log rotation policy for file output.
    #[serde(default)]
    pub rotation: RotationPolicy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines.
    Json,
    /// Human-readable terminal output.
    Pretty,
}

/// Log file rotation policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Rotate once per day.
    #[default]
    Daily,
    /// Rotate hourly.
    Hourly,
    /// Single file, never rotated.
    Never,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

const fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
        }
    }
}
