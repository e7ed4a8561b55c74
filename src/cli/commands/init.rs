//! Implementation of the `rota init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

const STARTER_CONFIG: &str = r#"# rota configuration
#
# Values here can be overridden by rota.local.yaml and by ROTA_*
# environment variables (nested keys join with __, for example
# ROTA_HOME_ASSISTANT__TOKEN).

home_assistant:
  base_url: http://homeassistant.local:8123
  # Long-lived access token, created under your Home Assistant profile.
  token: ""
  timeout_secs: 30

scheduler:
  # How far past midnight a daemon start still counts as having missed
  # today's run, triggering an immediate catch-up pass.
  catch_up_grace_secs: 60

trigger:
  # Local HTTP API for running a pass on demand (POST /api/run).
  enabled: false
  host: 127.0.0.1
  port: 8126

logging:
  level: info
  format: pretty

# Recurring tasks. Every period_days from start_date the task's name is
# added to the given todo list, unless an open item with the same name
# is already on it.
tasks:
  - name: Water the plants
    list: todo.chores
    start_date: "2025-01-06"
    period_days: 7
    # Optional: only remind on this weekday (0 = Monday .. 6 = Sunday).
    # weekday: 0
"#;

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        if self.success {
            format!(
                "{}\n\nWrote {}\nSet home_assistant.token, describe your tasks, then try 'rota check'.",
                self.message,
                self.config_path.display()
            )
        } else {
            self.message.clone()
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let config_path = args.path.join("rota.yaml");

    if config_path.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: format!(
                "{} already exists. Use --force to overwrite.",
                config_path.display()
            ),
            config_path,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    if !args.path.exists() {
        fs::create_dir_all(&args.path)
            .await
            .with_context(|| format!("Failed to create {}", args.path.display()))?;
    }

    fs::write(&config_path, STARTER_CONFIG)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Config rewritten.".to_string()
        } else {
            "Config created.".to_string()
        },
        config_path,
    };

    output(&output_data, json_mode);
    Ok(())
}
