//! Implementation of the `rota check` command.
//!
//! Runs one evaluation pass for today against the configured Home
//! Assistant instance and prints the report. Useful for verifying a
//! config before leaving the daemon to it.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::adapters::clock::SystemClock;
use crate::adapters::hass::HassTodoClient;
use crate::cli::load_config;
use crate::cli::output::{create_spinner, output, CommandOutput};
use crate::domain::models::report::EvaluationReport;
use crate::domain::ports::Clock;
use crate::services::DueEvaluator;

#[derive(Debug, serde::Serialize)]
pub struct ReportOutput {
    #[serde(flatten)]
    pub report: EvaluationReport,
}

impl CommandOutput for ReportOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let mut lines = vec![format!("Evaluation for {}:", report.date)];
        lines.push(format!("  Tasks evaluated: {}", report.evaluated));

        if !report.created.is_empty() {
            lines.push(String::new());
            lines.push("Created:".to_string());
            for item in &report.created {
                lines.push(format!("  - {} on {} (due {})", item.name, item.list, item.due));
            }
        }

        if !report.already_present.is_empty() {
            lines.push(String::new());
            lines.push("Already present:".to_string());
            for name in &report.already_present {
                lines.push(format!("  - {name}"));
            }
        }

        lines.push(String::new());
        lines.push(format!("Not due today: {}", report.not_due));

        if !report.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failed:".to_string());
            for failure in &report.failures {
                lines.push(format!("  - {} on {}: {}", failure.name, failure.list, failure.error));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(json_mode: bool, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    anyhow::ensure!(
        !config.home_assistant.token.trim().is_empty(),
        "home_assistant.token is not set; add it to rota.yaml or ROTA_HOME_ASSISTANT__TOKEN"
    );

    let chores = config.chores()?;
    let client = Arc::new(HassTodoClient::from_config(&config.home_assistant)?);
    let evaluator = DueEvaluator::new(client);
    let today = SystemClock.today();

    let spinner = (!json_mode)
        .then(|| create_spinner(format!("Evaluating {} task(s) for {today}...", chores.len())));

    let report = evaluator.process_due_tasks(&chores, today).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let failed = report.has_failures();
    let failures = report.failures.len();
    output(&ReportOutput { report }, json_mode);

    anyhow::ensure!(!failed, "evaluation completed with {failures} failure(s)");
    Ok(())
}
