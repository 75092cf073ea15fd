//! HTTP transport for the orchestrator.
//!
//! The transport admits concurrent requests, so every mutation goes
//! through the orchestrator write lock and status reads take the read
//! lock; nothing observes the ledger mid-update.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use overseer_core::{TaskId, TaskReport};

use crate::guard::{ActionContext, ActionGuard, ActionRequest};
use crate::metrics::MetricsSink;
use crate::orchestrator::Orchestrator;

/// Shared application state.
pub struct AppState {
    /// The single orchestrator instance. All mutations serialize on
    /// the write half of this lock; the report-ingestion loop holds a
    /// clone of the same Arc.
    pub orchestrator: Arc<RwLock<Orchestrator>>,

    /// Rule set for action validation.
    pub guard: ActionGuard,

    /// Metrics sink shared with the orchestrator.
    pub metrics: Arc<MetricsSink>,
}

impl AppState {
    /// Wrap an orchestrator (and its metrics sink) for the router.
    pub fn new(orchestrator: Arc<RwLock<Orchestrator>>, metrics: Arc<MetricsSink>) -> Arc<Self> {
        Arc::new(Self {
            orchestrator,
            guard: ActionGuard::with_default_rules(),
            metrics,
        })
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/plan", post(load_plan))
        .route("/cycle", post(run_cycle))
        .route("/report", post(receive_report))
        .route("/status", get(get_status))
        .route("/tasks", get(list_tasks))
        .route("/tasks/:id/reset", post(reset_task))
        .route("/action/validate", post(validate_action))
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Load a project plan, replacing the current ledger.
///
/// The body is parsed strictly: malformed JSON or a missing `tasks`
/// key is a client error, never silently defaulted.
async fn load_plan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let plan = match overseer_core::Plan::from_value(body) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(error = %e, "Rejected plan");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let task_count = plan.tasks.len();
    state.orchestrator.write().await.load_project_plan(plan);
    info!(tasks = task_count, "Plan loaded via HTTP");

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Project plan loaded.",
            "tasks": task_count,
        })),
    )
        .into_response()
}

/// Run one orchestration cycle.
///
/// Returns the assigned task, or null when no eligible task remains
/// (the cycle is then a no-op signaling project completion).
async fn run_cycle(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let task = state.orchestrator.write().await.run_orchestration_cycle();
    Json(serde_json::json!({ "assigned": task }))
}

/// Ingest an executor report.
///
/// Always succeeds: unknown task ids and unrecognized statuses are
/// tolerated (logged, ledger unchanged) rather than surfaced.
async fn receive_report(
    State(state): State<Arc<AppState>>,
    Json(report): Json<TaskReport>,
) -> impl IntoResponse {
    let task_id = report.task_id.clone();
    let status = report.status.clone();
    state.orchestrator.write().await.receive_report(report);

    Json(serde_json::json!({
        "message": format!("Report received for task {} with status {}.", task_id, status),
    }))
}

/// Full status snapshot.
async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.orchestrator.read().await.get_status();
    Json(snapshot)
}

/// List all project tasks.
async fn list_tasks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.orchestrator.read().await.get_status();
    Json(serde_json::json!({
        "tasks": snapshot.project_tasks,
        "total_count": snapshot.project_tasks.len(),
    }))
}

/// Explicitly reset a failed task to pending.
async fn reset_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let task_id = TaskId::new(id);
    let reset = state.orchestrator.write().await.reset_task(&task_id);

    if reset {
        Json(serde_json::json!({ "reset": true })).into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Task {} is not in a resettable state", task_id),
            }),
        )
            .into_response()
    }
}

/// Validate a proposed action against the guard rules.
async fn validate_action(
    State(state): State<Arc<AppState>>,
    Json(action): Json<ActionRequest>,
) -> impl IntoResponse {
    let ctx = ActionContext {
        current_task: state.orchestrator.read().await.current_task_id(),
    };
    Json(state.guard.evaluate(&action, &ctx))
}

/// Prometheus metrics.
async fn render_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.metrics.render()
}
