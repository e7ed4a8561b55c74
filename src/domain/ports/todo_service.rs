//! Port for the external to-do list collaborator.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::errors::RotaResult;

/// One open item on an external to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Display text of the item; compared exactly against chore names.
    pub summary: String,

    /// Collaborator-assigned identifier, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// The to-do list service this system creates reminders on.
///
/// Implementations own their transport semantics (auth, timeouts); the
/// core adds no retry or timeout layer on top.
#[async_trait]
pub trait TodoService: Send + Sync {
    /// Fetch the currently open ("needs action") items of a list.
    async fn open_items(&self, list: &str) -> RotaResult<Vec<TodoItem>>;

    /// Create an item on a list, due at the given local wall-clock time.
    async fn add_item(&self, list: &str, summary: &str, due: NaiveDateTime) -> RotaResult<()>;
}
