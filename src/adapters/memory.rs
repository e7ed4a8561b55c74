//! In-memory to-do service for testing.
//!
//! Backs the test suites that exercise evaluation and scheduling without
//! a real smart-home platform. Created items land in the open set, so
//! consecutive passes observe each other's effects the way live passes
//! do through the external list.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{RotaError, RotaResult};
use crate::domain::ports::{TodoItem, TodoService};

/// A create-item call recorded by the in-memory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRecord {
    /// Target list of the call.
    pub list: String,
    /// Item display text.
    pub summary: String,
    /// Requested due time.
    pub due: NaiveDateTime,
}

/// In-memory [`TodoService`] with seeding and failure injection.
pub struct InMemoryTodoService {
    lists: Arc<RwLock<HashMap<String, Vec<TodoItem>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    queries: Arc<RwLock<Vec<String>>>,
    created: Arc<RwLock<Vec<CreatedRecord>>>,
}

impl InMemoryTodoService {
    pub fn new() -> Self {
        Self {
            lists: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            created: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Seed an open item onto a list.
    pub async fn seed_item(&self, list: &str, summary: &str) {
        let mut lists = self.lists.write().await;
        lists.entry(list.to_string()).or_default().push(TodoItem {
            summary: summary.to_string(),
            uid: None,
        });
    }

    /// Make every call against `list` fail with a collaborator error.
    pub async fn fail_list(&self, list: &str) {
        let mut failing = self.failing.write().await;
        failing.insert(list.to_string());
    }

    /// Lists queried so far, in call order.
    pub async fn queried_lists(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// All create-item calls recorded so far, in call order.
    pub async fn created_items(&self) -> Vec<CreatedRecord> {
        self.created.read().await.clone()
    }

    /// Drop all state, including recorded calls.
    pub async fn clear(&self) {
        self.lists.write().await.clear();
        self.failing.write().await.clear();
        self.queries.write().await.clear();
        self.created.write().await.clear();
    }

    async fn check_failure(&self, list: &str, operation: &str) -> RotaResult<()> {
        if self.failing.read().await.contains(list) {
            return Err(RotaError::Collaborator {
                list: list.to_string(),
                operation: operation.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryTodoService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoService for InMemoryTodoService {
    async fn open_items(&self, list: &str) -> RotaResult<Vec<TodoItem>> {
        self.queries.write().await.push(list.to_string());
        self.check_failure(list, "get_items").await?;
        let lists = self.lists.read().await;
        Ok(lists.get(list).cloned().unwrap_or_default())
    }

    async fn add_item(&self, list: &str, summary: &str, due: NaiveDateTime) -> RotaResult<()> {
        self.check_failure(list, "add_item").await?;
        self.created.write().await.push(CreatedRecord {
            list: list.to_string(),
            summary: summary.to_string(),
            due,
        });
        let mut lists = self.lists.write().await;
        lists.entry(list.to_string()).or_default().push(TodoItem {
            summary: summary.to_string(),
            uid: None,
        });
        Ok(())
    }
}
