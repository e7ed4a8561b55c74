//! Rota - Recurring task reminders for Home Assistant
//!
//! Rota turns a list of recurring task definitions into to-do items on
//! Home Assistant lists: every `period_days` from a task's start date
//! (optionally gated to one weekday), the task's name is added to its
//! list unless an open item with the same name is already there. A
//! midnight timer chain re-evaluates the whole set once per local day.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Task model, validation, and ports
//! - **Service Layer** (`services`): Due evaluation, scheduling, sessions
//! - **Adapters** (`adapters`): Home Assistant client, trigger API, clocks
//! - **Infrastructure Layer** (`infrastructure`): Config loading and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use rota::adapters::clock::SystemClock;
//! use rota::adapters::hass::HassTodoClient;
//! use rota::services::SessionManager;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let todo = Arc::new(HassTodoClient::new("http://homeassistant.local:8123", "token", 30)?);
//!     let manager = SessionManager::new(todo, Arc::new(SystemClock), 60);
//!     // manager.replace(chores).await?; arms the midnight chain
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{RotaError, RotaResult};
pub use domain::models::{
    due_timestamp, parse_tasks_blob, serialize_tasks, validate_tasks, Chore, Config,
    EvaluationReport, HomeAssistantConfig, LogConfig, SchedulerConfig, TriggerConfig,
    DUE_TIME_FORMAT,
};
pub use domain::ports::{Clock, TodoItem, TodoService};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{DueEvaluator, MidnightScheduler, SessionManager};
