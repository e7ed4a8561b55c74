use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Home Assistant base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid base_url: {0}. Must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Invalid timeout_secs: {0}. Must be positive")]
    InvalidTimeout(u64),

    #[error("Invalid catch_up_grace_secs: {0}. Must be at most 86400")]
    InvalidGrace(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Trigger host cannot be empty when the trigger server is enabled")]
    EmptyTriggerHost,

    #[error("Invalid task definitions: {0}")]
    InvalidTasks(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. rota.yaml (primary config, created by init)
    /// 3. rota.local.yaml (local overrides, optional)
    /// 4. Environment variables (ROTA_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            // 1. Start with programmatic defaults
            .merge(Serialized::defaults(Config::default()))
            // 2. Merge primary config
            .merge(Yaml::file("rota.yaml"))
            // 3. Merge local overrides (optional, for dev/test overrides)
            .merge(Yaml::file("rota.local.yaml"))
            // 4. Merge environment variables (highest priority)
            .merge(Env::prefixed("ROTA_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// The access token is deliberately not required here; commands
    /// that never talk to the instance work without one, and the ones
    /// that do check it themselves.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Validate the Home Assistant connection
        let base_url = config.home_assistant.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }
        if config.home_assistant.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.home_assistant.timeout_secs));
        }

        // Validate scheduler config
        if config.scheduler.catch_up_grace_secs > 86_400 {
            return Err(ConfigError::InvalidGrace(config.scheduler.catch_up_grace_secs));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        // Validate trigger config
        if config.trigger.enabled && config.trigger.host.trim().is_empty() {
            return Err(ConfigError::EmptyTriggerHost);
        }

        // Validate task definitions
        config
            .chores()
            .map_err(|e| ConfigError::InvalidTasks(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::LogFormat;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.home_assistant.base_url, "http://homeassistant.local:8123");
        assert_eq!(config.home_assistant.timeout_secs, 30);
        assert_eq!(config.scheduler.catch_up_grace_secs, 60);
        assert!(!config.trigger.enabled);
        assert_eq!(config.logging.level, "info");
        assert!(config.tasks.is_empty());
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
home_assistant:
  base_url: http://192.168.1.10:8123
  token: abc123
  timeout_secs: 10
scheduler:
  catch_up_grace_secs: 120
trigger:
  enabled: true
  port: 9200
logging:
  level: debug
  format: json
tasks:
  - name: Red bin
    list: todo.chores
    start_date: "2025-11-18"
    period_days: 14
"#;

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.home_assistant.base_url, "http://192.168.1.10:8123");
        assert_eq!(config.home_assistant.token, "abc123");
        assert_eq!(config.home_assistant.timeout_secs, 10);
        assert_eq!(config.scheduler.catch_up_grace_secs, 120);
        assert!(config.trigger.enabled);
        assert_eq!(config.trigger.port, 9200);
        assert_eq!(config.trigger.host, "127.0.0.1", "Default should fill omitted fields");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.tasks.len(), 1);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
        let chores = config.chores().unwrap();
        assert_eq!(chores[0].name, "Red bin");
        assert_eq!(chores[0].period_days, 14);
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.home_assistant.base_url = "  ".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::EmptyBaseUrl));
    }

    #[test]
    fn test_validate_bad_url_scheme() {
        let mut config = Config::default();
        config.home_assistant.base_url = "ftp://homeassistant.local".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.home_assistant.timeout_secs = 0;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidTimeout(0)));
    }

    #[test]
    fn test_validate_grace_over_a_day() {
        let mut config = Config::default();
        config.scheduler.catch_up_grace_secs = 86_401;

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidGrace(86_401)));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        match result.unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_trigger_host_required_when_enabled() {
        let mut config = Config::default();
        config.trigger.host = String::new();
        ConfigLoader::validate(&config).expect("Host only matters when enabled");

        config.trigger.enabled = true;
        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::EmptyTriggerHost));
    }

    #[test]
    fn test_validate_rejects_bad_task_record() {
        let mut config = Config::default();
        config.tasks = vec![serde_json::json!({
            "name": "",
            "list": "todo.chores",
            "start_date": "2025-11-18",
            "period_days": 14,
        })];

        let result = ConfigLoader::validate(&config);
        assert!(result.is_err());
        match result.unwrap_err() {
            ConfigError::InvalidTasks(msg) => assert!(msg.contains("index 0")),
            other => panic!("Expected InvalidTasks error, got {other:?}"),
        }
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        // Create base config
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "home_assistant:\n  base_url: http://base:8123\n  token: base-token\nlogging:\n  level: info"
        )
        .unwrap();
        base_file.flush().unwrap();

        // Create override config
        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "logging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.logging.level, "debug", "Override should win");
        assert_eq!(
            config.home_assistant.base_url, "http://base:8123",
            "Base value should persist when not overridden"
        );
        assert_eq!(config.home_assistant.token, "base-token");
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("ROTA_HOME_ASSISTANT__TOKEN", Some("env-token")),
                ("ROTA_SCHEDULER__CATCH_UP_GRACE_SECS", Some("300")),
                ("ROTA_LOGGING__LEVEL", Some("warn")),
            ],
            || {
                let config: Config = Figment::new()
                    .merge(Serialized::defaults(Config::default()))
                    .merge(Env::prefixed("ROTA_").split("__"))
                    .extract()
                    .unwrap();

                assert_eq!(config.home_assistant.token, "env-token");
                assert_eq!(config.scheduler.catch_up_grace_secs, 300);
                assert_eq!(config.logging.level, "warn");
            },
        );
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let config = ConfigLoader::load_from_file(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.scheduler.catch_up_grace_secs, 60);
    }
}
