use crate::domain::models::{
    dispatch::Dispatch,
    execution_log::ExecutionLogEntry,
    webhook::{DeliveryOutcome, WebhookPayload},
};
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait DispatchRepository: Send + Sync {
    /// Dispatches whose scheduled time has passed, not yet sent and not
    /// holding a live lock, bounded by `limit`.
    async fn fetch_due(&self, limit: i32) -> Result<Vec<Dispatch>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Dispatch>, AppError>;

    async fn list(&self) -> Result<Vec<Dispatch>, AppError>;

    /// Atomic check-and-set: grants the lock iff no live lock exists.
    /// Exactly one concurrent caller gets `true` for a given lock epoch.
    async fn acquire_lock(
        &self,
        dispatch_id: &str,
        executor_id: &str,
        ttl_secs: i64,
    ) -> Result<bool, AppError>;

    /// Revokes locks past their TTL, returning how many were revoked.
    async fn cleanup_expired_locks(&self) -> Result<u64, AppError>;

    /// Releases the lock, bumps the attempt counter and, on success, moves
    /// the dispatch to its terminal `sent` status. On failure the status is
    /// left as-is so the dispatch stays eligible for a later cycle.
    async fn complete(
        &self,
        dispatch_id: &str,
        success: bool,
        error_message: Option<String>,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait ExecutionLogRepository: Send + Sync {
    async fn append(&self, entry: &ExecutionLogEntry) -> Result<(), AppError>;
    async fn list_by_dispatch(&self, dispatch_id: &str) -> Result<Vec<ExecutionLogEntry>, AppError>;
}

#[async_trait]
pub trait WebhookService: Send + Sync {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<DeliveryOutcome, AppError>;
}
