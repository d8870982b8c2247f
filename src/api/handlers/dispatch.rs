use axum::{extract::{Path, State}, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::webhook::WebhookPayload;
use crate::domain::services::dispatcher::DispatchRunner;
use crate::error::AppError;
use crate::state::AppState;

/// Runs one dispatch cycle immediately. Safe to call while the background
/// worker is running; contended dispatches come back as `skipped`.
pub async fn run_dispatch_cycle(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let runner = DispatchRunner::new(
        state.dispatch_repo.clone(),
        state.execution_log_repo.clone(),
        state.webhook_service.clone(),
        state.config.executor_id.clone(),
        state.config.batch_limit,
        state.config.lock_ttl_secs,
    );

    let report = runner.run_once().await?;
    info!("Manual dispatch cycle: processed={}", report.processed);
    Ok(Json(report))
}

pub async fn list_dispatches(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let dispatches = state.dispatch_repo.list().await?;
    Ok(Json(dispatches))
}

pub async fn get_execution_logs(
    State(state): State<Arc<AppState>>,
    Path(dispatch_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let dispatch = state.dispatch_repo.find_by_id(&dispatch_id).await?
        .ok_or(AppError::NotFound(format!("Dispatch {} not found", dispatch_id)))?;

    let logs = state.execution_log_repo.list_by_dispatch(&dispatch.id).await?;
    Ok(Json(logs))
}

/// Sends the dispatch to the configured test group without touching status,
/// locks or execution logs.
pub async fn test_send(
    State(state): State<Arc<AppState>>,
    Path(dispatch_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if state.config.test_group_id.is_empty() {
        return Err(AppError::Validation("TEST_GROUP_ID is not configured".into()));
    }

    let dispatch = state.dispatch_repo.find_by_id(&dispatch_id).await?
        .ok_or(AppError::NotFound(format!("Dispatch {} not found", dispatch_id)))?;

    let payload = WebhookPayload::test(&dispatch, &state.config.test_group_id);
    let outcome = state.webhook_service.deliver(&payload).await?;

    info!("Test send for {}: HTTP {}", dispatch.id, outcome.status_code);
    Ok(Json(json!({
        "success": outcome.success,
        "webhook_status": outcome.status_code
    })))
}
