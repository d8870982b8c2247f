use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use crate::api::handlers::{dispatch, health};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Dispatcher
        .route("/api/v1/dispatch/run", post(dispatch::run_dispatch_cycle))

        // Read-only operator surface
        .route("/api/v1/dispatches", get(dispatch::list_dispatches))
        .route("/api/v1/dispatches/{dispatch_id}/logs", get(dispatch::get_execution_logs))

        // Manual test send
        .route("/api/v1/dispatches/{dispatch_id}/test-send", post(dispatch::test_send))

        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %Uuid::new_v4()
                )
            }),
        )
        .with_state(state)
}
