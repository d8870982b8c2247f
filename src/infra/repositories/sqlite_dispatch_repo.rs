use crate::domain::{models::dispatch::Dispatch, ports::DispatchRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

pub struct SqliteDispatchRepo {
    pool: SqlitePool,
}

impl SqliteDispatchRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl DispatchRepository for SqliteDispatchRepo {
    async fn fetch_due(&self, limit: i32) -> Result<Vec<Dispatch>, AppError> {
        let now = Utc::now();
        // scheduled_date and scheduled_time are zero-padded ISO fragments, so
        // the concatenation compares chronologically as text.
        let now_minute = now.format("%Y-%m-%d %H:%M").to_string();
        sqlx::query_as::<_, Dispatch>(
            r#"
            SELECT * FROM dispatches
            WHERE status = 'scheduled'
              AND (scheduled_date || ' ' || scheduled_time) <= ?
              AND (locked_by IS NULL OR locked_until < ?)
            ORDER BY scheduled_date ASC, scheduled_time ASC
            LIMIT ?
            "#
        )
            .bind(now_minute)
            .bind(now)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Dispatch>, AppError> {
        sqlx::query_as::<_, Dispatch>("SELECT * FROM dispatches WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Dispatch>, AppError> {
        sqlx::query_as::<_, Dispatch>(
            "SELECT * FROM dispatches ORDER BY created_at DESC LIMIT 100"
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn acquire_lock(
        &self,
        dispatch_id: &str,
        executor_id: &str,
        ttl_secs: i64,
    ) -> Result<bool, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE dispatches
            SET locked_by = ?, locked_until = ?, updated_at = ?
            WHERE id = ?
              AND status != 'sent'
              AND (locked_by IS NULL OR locked_until < ?)
            "#
        )
            .bind(executor_id)
            .bind(now + Duration::seconds(ttl_secs))
            .bind(now)
            .bind(dispatch_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() == 1)
    }

    async fn cleanup_expired_locks(&self) -> Result<u64, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE dispatches
            SET locked_by = NULL, locked_until = NULL, updated_at = ?
            WHERE locked_by IS NOT NULL AND locked_until < ?
            "#
        )
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn complete(
        &self,
        dispatch_id: &str,
        success: bool,
        error_message: Option<String>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE dispatches
            SET locked_by = NULL,
                locked_until = NULL,
                status = CASE WHEN ? THEN 'sent' ELSE status END,
                error_message = ?,
                execution_attempts = execution_attempts + 1,
                updated_at = ?
            WHERE id = ?
            "#
        )
            .bind(success)
            .bind(error_message)
            .bind(Utc::now())
            .bind(dispatch_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
