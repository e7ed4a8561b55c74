//! Manual trigger HTTP server.
//!
//! Exposes a small local API over the live reminder session: running an
//! evaluation pass on demand and inspecting the armed task set. Bound
//! to loopback and disabled by default.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::domain::models::chore::{Chore, START_DATE_FORMAT};
use crate::domain::models::config::TriggerConfig;
use crate::domain::models::report::EvaluationReport;
use crate::domain::ports::{Clock, TodoService};
use crate::domain::RotaError;
use crate::services::SessionManager;

/// The live session and its armed tasks.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub tasks: Vec<TaskView>,
}

/// One armed task, with its next due date from today's perspective.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub name: String,
    pub list: String,
    pub start_date: String,
    pub period_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_on: Option<String>,
}

impl TaskView {
    fn from_chore(chore: &Chore, today: chrono::NaiveDate) -> Self {
        Self {
            name: chore.name.clone(),
            list: chore.list.clone(),
            start_date: chore.start_date.format(START_DATE_FORMAT).to_string(),
            period_days: chore.period_days,
            weekday: chore.weekday,
            next_due_on: chore
                .next_due_on(today)
                .map(|date| date.format(START_DATE_FORMAT).to_string()),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Shared state for the trigger server.
struct AppState<T: TodoService, C: Clock> {
    manager: Arc<SessionManager<T, C>>,
}

/// Trigger HTTP server.
pub struct TriggerServer<T: TodoService + 'static, C: Clock + 'static> {
    config: TriggerConfig,
    manager: Arc<SessionManager<T, C>>,
}

impl<T: TodoService + 'static, C: Clock + 'static> TriggerServer<T, C> {
    pub fn new(manager: Arc<SessionManager<T, C>>, config: TriggerConfig) -> Self {
        Self { config, manager }
    }

    /// Build the router. Public so tests can drive it directly.
    pub fn build_router(self) -> Router {
        let state = Arc::new(AppState { manager: self.manager });

        let app = Router::new()
            .route("/api/run", post(run_now::<T, C>))
            .route("/api/tasks", get(current_tasks::<T, C>))
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("trigger server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn run_now<T: TodoService + 'static, C: Clock + 'static>(
    State(state): State<Arc<AppState<T, C>>>,
) -> Result<Json<EvaluationReport>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.run_now().await {
        Ok(report) => Ok(Json(report)),
        Err(e @ RotaError::NoActiveSession) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
                code: "NO_SESSION".to_string(),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
                code: "RUN_ERROR".to_string(),
            }),
        )),
    }
}

async fn current_tasks<T: TodoService + 'static, C: Clock + 'static>(
    State(state): State<Arc<AppState<T, C>>>,
) -> Result<Json<SessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.snapshot().await {
        Ok((session_id, chores)) => {
            let today = state.manager.today();
            let tasks = chores
                .iter()
                .map(|chore| TaskView::from_chore(chore, today))
                .collect();
            Ok(Json(SessionResponse { session_id, tasks }))
        }
        Err(e) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
                code: "NO_SESSION".to_string(),
            }),
        )),
    }
}
