//! Task definition CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio::fs;

use crate::adapters::clock::SystemClock;
use crate::cli::load_config;
use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::chore::{parse_tasks_blob, Chore, START_DATE_FORMAT};
use crate::domain::ports::Clock;

#[derive(Args, Debug)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommands,
}

#[derive(Subcommand, Debug)]
pub enum TasksCommands {
    /// List configured tasks with their next due dates
    List,

    /// Validate task definitions without touching Home Assistant
    Validate {
        /// Read a JSON task list from this file instead of the config
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

// -- Output structs --

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn weekday_name(day: u8) -> &'static str {
    WEEKDAY_NAMES.get(usize::from(day)).copied().unwrap_or("?")
}

#[derive(Debug, serde::Serialize)]
pub struct TaskRow {
    pub name: String,
    pub list: String,
    pub start_date: String,
    pub period_days: u32,
    pub weekday: Option<String>,
    pub next_due_on: Option<String>,
}

impl TaskRow {
    fn from_chore(chore: &Chore, today: chrono::NaiveDate) -> Self {
        Self {
            name: chore.name.clone(),
            list: chore.list.clone(),
            start_date: chore.start_date.format(START_DATE_FORMAT).to_string(),
            period_days: chore.period_days,
            weekday: chore.weekday.map(|day| weekday_name(day).to_string()),
            next_due_on: chore
                .next_due_on(today)
                .map(|date| date.format(START_DATE_FORMAT).to_string()),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TaskListOutput {
    pub tasks: Vec<TaskRow>,
    pub total: usize,
}

impl CommandOutput for TaskListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["name", "list", "start", "every", "weekday", "next due"]);
        for row in &self.tasks {
            table.add_row(vec![
                truncate(&row.name, 30),
                truncate(&row.list, 24),
                row.start_date.clone(),
                format!("{}d", row.period_days),
                row.weekday.clone().unwrap_or_else(|| "-".to_string()),
                row.next_due_on.clone().unwrap_or_else(|| "never".to_string()),
            ]);
        }
        render_list("task", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ValidateOutput {
    pub valid: bool,
    pub total: usize,
    pub source: String,
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        format!("{} task(s) from {} are valid.", self.total, self.source)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// -- Execute --

pub async fn execute(args: TasksArgs, json_mode: bool, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        TasksCommands::List => {
            let config = load_config(config_path)?;
            let chores = config.chores()?;
            let today = SystemClock.today();

            let out = TaskListOutput {
                total: chores.len(),
                tasks: chores.iter().map(|chore| TaskRow::from_chore(chore, today)).collect(),
            };
            output(&out, json_mode);
        }

        TasksCommands::Validate { file } => {
            let (chores, source) = match file {
                Some(path) => {
                    let blob = fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    (parse_tasks_blob(&blob)?, path.display().to_string())
                }
                None => {
                    let config = load_config(config_path)?;
                    (config.chores()?, "config".to_string())
                }
            };

            let out = ValidateOutput { valid: true, total: chores.len(), source };
            output(&out, json_mode);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn chore() -> Chore {
        Chore {
            name: "Red bin".to_string(),
            list: "todo.chores".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 18).unwrap(),
            period_days: 14,
            weekday: Some(1),
        }
    }

    #[test]
    fn test_task_row_renders_weekday_and_next_due() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let row = TaskRow::from_chore(&chore(), today);
        assert_eq!(row.weekday.as_deref(), Some("Tue"));
        assert_eq!(row.next_due_on.as_deref(), Some("2025-12-02"));
    }

    #[test]
    fn test_list_output_human_has_rows() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        let out = TaskListOutput {
            tasks: vec![TaskRow::from_chore(&chore(), today)],
            total: 1,
        };
        let human = out.to_human();
        assert!(human.contains("Red bin"));
        assert!(human.contains("14d"));
        assert!(human.contains("2025-12-02"));
    }

    #[test]
    fn test_weekday_name_bounds() {
        assert_eq!(weekday_name(0), "Mon");
        assert_eq!(weekday_name(6), "Sun");
        assert_eq!(weekday_name(9), "?");
    }
}
