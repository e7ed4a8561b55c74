//! Home Assistant REST API request and response models.
//!
//! These structs map to the `/api/services/todo/*` JSON payloads. They
//! are used internally by the Home Assistant adapter and are not part
//! of the public domain model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response wrapper for a service call made with `?return_response`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCallResponse {
    /// Per-entity payloads, keyed by entity id.
    ///
    /// An entity with nothing to report may be missing from the map
    /// entirely.
    #[serde(default)]
    pub service_response: HashMap<String, TodoListItems>,
}

/// The items of one todo-list entity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoListItems {
    /// Items matching the status filter of the request.
    #[serde(default)]
    pub items: Vec<HassTodoItem>,
}

/// A single todo item as returned by `todo.get_items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HassTodoItem {
    /// The item's display text.
    pub summary: String,
    /// Stable identifier, if the backing integration provides one.
    #[serde(default)]
    pub uid: Option<String>,
    /// Item status (e.g., "needs_action", "completed").
    #[serde(default)]
    pub status: Option<String>,
    /// Due timestamp in local time, if set.
    #[serde(default)]
    pub due: Option<String>,
}
