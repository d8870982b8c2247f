use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One immutable row per delivery attempt. Entries are append-only: nothing
/// in the service updates or deletes them after the insert.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ExecutionLogEntry {
    pub id: String,
    pub dispatch_id: String,
    pub attempt_number: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub success: bool,
    pub error_message: Option<String>,
    pub request_payload: Json<serde_json::Value>,
    pub response_status: Option<i32>,
    pub response_status_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ExecutionLogEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dispatch_id: &str,
        attempt_number: i32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        success: bool,
        error_message: Option<String>,
        request_payload: serde_json::Value,
        response_status: Option<i32>,
        response_status_text: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            dispatch_id: dispatch_id.to_string(),
            attempt_number,
            started_at,
            completed_at,
            success,
            error_message,
            request_payload: Json(request_payload),
            response_status,
            response_status_text,
            created_at: Utc::now(),
        }
    }
}
