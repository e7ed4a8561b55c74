//! Home Assistant todo client.
//!
//! Wraps the Home Assistant REST API, calling the `todo.get_items` and
//! `todo.add_item` services against a configured instance. This is the
//! production implementation of the [`TodoService`] port.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;

use crate::domain::errors::{RotaError, RotaResult};
use crate::domain::models::chore::DUE_TIME_FORMAT;
use crate::domain::models::config::HomeAssistantConfig;
use crate::domain::ports::{TodoItem, TodoService};

use super::models::ServiceCallResponse;

/// HTTP client for a Home Assistant instance's todo services.
///
/// All methods return [`RotaResult`] and map HTTP / network errors to
/// [`RotaError::Collaborator`], naming the list and operation that
/// failed.
#[derive(Debug, Clone)]
pub struct HassTodoClient {
    /// The underlying HTTP client.
    http: Client,
    /// Instance base URL without a trailing slash.
    base_url: String,
    /// Long-lived access token.
    token: String,
}

impl HassTodoClient {
    /// Create a new client for the given instance.
    pub fn new(base_url: &str, token: &str, timeout_secs: u64) -> RotaResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Create a client from the loaded configuration section.
    pub fn from_config(config: &HomeAssistantConfig) -> RotaResult<Self> {
        Self::new(&config.base_url, &config.token, config.timeout_secs)
    }

    /// Build an authorized POST to a `todo` domain service.
    fn service_post(&self, service: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/api/services/todo/{service}", self.base_url);
        self.http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
    }

    fn call_failed(&self, list: &str, operation: &str, reason: String) -> RotaError {
        RotaError::Collaborator {
            list: list.to_string(),
            operation: operation.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl TodoService for HassTodoClient {
    /// Fetch the open (needs-action) items of one todo list.
    ///
    /// A list the instance reports nothing for is treated as empty
    /// rather than an error.
    async fn open_items(&self, list: &str) -> RotaResult<Vec<TodoItem>> {
        let body = serde_json::json!({
            "entity_id": list,
            "status": ["needs_action"],
        });

        let resp = self
            .service_post("get_items?return_response")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.call_failed(list, "get_items", format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(self.call_failed(
                list,
                "get_items",
                format!("returned {status}: {text}"),
            ));
        }

        let parsed = resp
            .json::<ServiceCallResponse>()
            .await
            .map_err(|e| self.call_failed(list, "get_items", format!("parse failed: {e}")))?;

        let items = parsed
            .service_response
            .get(list)
            .map(|entity| entity.items.clone())
            .unwrap_or_default();

        Ok(items
            .into_iter()
            .map(|item| TodoItem { summary: item.summary, uid: item.uid })
            .collect())
    }

    /// Create a new item on a todo list with a local due timestamp.
    async fn add_item(&self, list: &str, summary: &str, due: NaiveDateTime) -> RotaResult<()> {
        let body = serde_json::json!({
            "entity_id": list,
            "item": summary,
            "due_datetime": due.format(DUE_TIME_FORMAT).to_string(),
        });

        let resp = self
            .service_post("add_item")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.call_failed(list, "add_item", format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(self.call_failed(
                list,
                "add_item",
                format!("returned {status}: {text}"),
            ));
        }

        Ok(())
    }
}
