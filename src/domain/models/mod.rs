pub mod chore;
pub mod config;
pub mod report;

pub use chore::{
    due_timestamp, parse_tasks_blob, serialize_tasks, validate_tasks, Chore, DUE_TIME_FORMAT,
    START_DATE_FORMAT,
};
pub use config::{
    Config, HomeAssistantConfig, LogConfig, LogFormat, RotationPolicy, SchedulerConfig,
    TriggerConfig,
};
pub use report::{ChoreFailure, CreatedItem, EvaluationReport};
