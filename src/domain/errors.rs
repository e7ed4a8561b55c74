//! Domain errors for the rota reminder system.

use thiserror::Error;

/// Domain-level errors that can occur while validating, evaluating, or
/// scheduling recurring chores.
#[derive(Debug, Error)]
pub enum RotaError {
    /// A task record failed validation. Carries the record's position in
    /// the input sequence and the field that violated its constraint.
    #[error("Invalid task at index {index}: {field}: {reason}")]
    InvalidTask { index: usize, field: &'static str, reason: String },

    /// The serialized task blob did not decode to a list of records.
    #[error("Malformed task list: {0}")]
    MalformedTasks(String),

    /// A call to the to-do list collaborator failed or returned an
    /// unexpected shape.
    #[error("Todo list call failed: {operation} on {list}: {reason}")]
    Collaborator { list: String, operation: String, reason: String },

    /// An operation referenced a scheduling session that is not running.
    #[error("No active reminder session")]
    NoActiveSession,

    /// Computing or arming the next wake-up failed. Fatal to the timer
    /// chain that hit it.
    #[error("Scheduling failed: {0}")]
    Scheduling(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

pub type RotaResult<T> = Result<T, RotaError>;

impl From<reqwest::Error> for RotaError {
    fn from(err: reqwest::Error) -> Self {
        RotaError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for RotaError {
    fn from(err: serde_json::Error) -> Self {
        RotaError::MalformedTasks(err.to_string())
    }
}
