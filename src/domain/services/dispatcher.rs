use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::models::dispatch::Dispatch;
use crate::domain::models::execution_log::ExecutionLogEntry;
use crate::domain::models::webhook::WebhookPayload;
use crate::domain::ports::{DispatchRepository, ExecutionLogRepository, WebhookService};
use crate::error::AppError;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent,
    Failed,
    Skipped,
    Error,
}

#[derive(Debug, Serialize, Clone)]
pub struct DispatchResult {
    pub id: String,
    pub name: String,
    pub status: DispatchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one dispatcher invocation, returned to the caller even when
/// individual dispatches failed.
#[derive(Debug, Serialize, Clone)]
pub struct DispatchReport {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<DispatchResult>,
    pub cleaned_locks: u64,
}

/// Drives one batch of due dispatches through
/// lock -> deliver -> log -> complete. Stateless across invocations: the
/// store's lock column is the only guard against overlapping runs.
pub struct DispatchRunner {
    dispatch_repo: Arc<dyn DispatchRepository>,
    execution_log_repo: Arc<dyn ExecutionLogRepository>,
    webhook_service: Arc<dyn WebhookService>,
    executor_id: String,
    batch_limit: i32,
    lock_ttl_secs: i64,
}

impl DispatchRunner {
    pub fn new(
        dispatch_repo: Arc<dyn DispatchRepository>,
        execution_log_repo: Arc<dyn ExecutionLogRepository>,
        webhook_service: Arc<dyn WebhookService>,
        executor_id: String,
        batch_limit: i32,
        lock_ttl_secs: i64,
    ) -> Self {
        Self {
            dispatch_repo,
            execution_log_repo,
            webhook_service,
            executor_id,
            batch_limit,
            lock_ttl_secs,
        }
    }

    /// Runs one dispatch cycle. Only a failure to fetch the due batch is
    /// fatal; everything after that degrades per dispatch.
    pub async fn run_once(&self) -> Result<DispatchReport, AppError> {
        let due = self.dispatch_repo.fetch_due(self.batch_limit).await?;

        if due.is_empty() {
            return Ok(DispatchReport {
                success: true,
                processed: 0,
                results: Vec::new(),
                cleaned_locks: 0,
            });
        }

        info!("Found {} dispatch(es) ready to execute", due.len());

        let mut results = Vec::with_capacity(due.len());

        for dispatch in &due {
            let span = info_span!("dispatch", dispatch_id = %dispatch.id, name = %dispatch.name);

            let result = async {
                match self.process_dispatch(dispatch).await {
                    Ok(result) => result,
                    Err(e) => {
                        // Per-dispatch boundary: one failure never aborts the batch.
                        let msg = e.to_string();
                        error!("Dispatch processing failed: {}", msg);
                        if let Err(ce) = self
                            .dispatch_repo
                            .complete(&dispatch.id, false, Some(msg.clone()))
                            .await
                        {
                            error!("Failed to mark dispatch as failed: {:?}", ce);
                        }
                        DispatchResult {
                            id: dispatch.id.clone(),
                            name: dispatch.name.clone(),
                            status: DispatchOutcome::Error,
                            reason: None,
                            webhook_status: None,
                            error: Some(msg),
                        }
                    }
                }
            }
            .instrument(span)
            .await;

            results.push(result);
        }

        let cleaned_locks = match self.dispatch_repo.cleanup_expired_locks().await {
            Ok(count) => {
                if count > 0 {
                    info!("Cleaned {} expired lock(s)", count);
                }
                count
            }
            Err(e) => {
                error!("Expired-lock cleanup failed: {:?}", e);
                0
            }
        };

        Ok(DispatchReport {
            success: true,
            processed: due.len(),
            results,
            cleaned_locks,
        })
    }

    async fn process_dispatch(&self, dispatch: &Dispatch) -> Result<DispatchResult, AppError> {
        // Lock contention and lock-step store errors both mean "someone else
        // may own this": skip, the dispatch stays due for a future cycle.
        let acquired = match self
            .dispatch_repo
            .acquire_lock(&dispatch.id, &self.executor_id, self.lock_ttl_secs)
            .await
        {
            Ok(acquired) => acquired,
            Err(e) => {
                warn!("Lock acquisition errored for {}: {:?}", dispatch.id, e);
                false
            }
        };

        if !acquired {
            info!("Could not acquire lock for {}", dispatch.id);
            return Ok(DispatchResult {
                id: dispatch.id.clone(),
                name: dispatch.name.clone(),
                status: DispatchOutcome::Skipped,
                reason: Some("lock_failed".to_string()),
                webhook_status: None,
                error: None,
            });
        }

        let started_at = Utc::now();
        let payload = WebhookPayload::production(dispatch, &self.executor_id);

        let (success, status_code, status_text, log_error, completion_error) =
            match self.webhook_service.deliver(&payload).await {
                Ok(outcome) => {
                    info!("Webhook responded with {}", outcome.status_code);
                    let log_error = if outcome.success {
                        None
                    } else {
                        Some(format!("HTTP {}", outcome.status_code))
                    };
                    let completion_error = if outcome.success {
                        None
                    } else {
                        Some(format!("Webhook returned {}", outcome.status_code))
                    };
                    (
                        outcome.success,
                        Some(outcome.status_code as i32),
                        Some(outcome.status_text),
                        log_error,
                        completion_error,
                    )
                }
                Err(e) => {
                    let msg = e.to_string();
                    warn!("Webhook request failed: {}", msg);
                    (false, None, None, Some(msg.clone()), Some(msg))
                }
            };

        let attempt_number = dispatch.execution_attempts.max(1);
        let entry = ExecutionLogEntry::new(
            &dispatch.id,
            attempt_number,
            started_at,
            Utc::now(),
            success,
            log_error,
            serde_json::to_value(&payload).unwrap_or_default(),
            status_code,
            status_text,
        );

        // Best effort: losing an audit row is better than a stuck dispatch.
        if let Err(e) = self.execution_log_repo.append(&entry).await {
            warn!("Failed to append execution log for {}: {:?}", dispatch.id, e);
        }

        self.dispatch_repo
            .complete(&dispatch.id, success, completion_error)
            .await?;

        Ok(DispatchResult {
            id: dispatch.id.clone(),
            name: dispatch.name.clone(),
            status: if success {
                DispatchOutcome::Sent
            } else {
                DispatchOutcome::Failed
            },
            reason: None,
            webhook_status: status_code.map(|c| c as u16),
            error: None,
        })
    }
}
