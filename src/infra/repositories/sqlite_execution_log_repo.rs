use crate::domain::{models::execution_log::ExecutionLogEntry, ports::ExecutionLogRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteExecutionLogRepo {
    pool: SqlitePool,
}

impl SqliteExecutionLogRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ExecutionLogRepository for SqliteExecutionLogRepo {
    async fn append(&self, entry: &ExecutionLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO dispatch_execution_logs
                (id, dispatch_id, attempt_number, started_at, completed_at,
                 success, error_message, request_payload, response_status,
                 response_status_text, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
            .bind(&entry.id)
            .bind(&entry.dispatch_id)
            .bind(entry.attempt_number)
            .bind(entry.started_at)
            .bind(entry.completed_at)
            .bind(entry.success)
            .bind(&entry.error_message)
            .bind(&entry.request_payload)
            .bind(entry.response_status)
            .bind(&entry.response_status_text)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_by_dispatch(&self, dispatch_id: &str) -> Result<Vec<ExecutionLogEntry>, AppError> {
        sqlx::query_as::<_, ExecutionLogEntry>(
            "SELECT * FROM dispatch_execution_logs WHERE dispatch_id = ? ORDER BY started_at ASC"
        )
            .bind(dispatch_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
