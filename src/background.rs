use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::domain::services::dispatcher::DispatchRunner;
use crate::state::AppState;

/// Fixed-cadence loop driving the dispatcher. Overlap with manual trigger
/// calls or other instances is expected; the store-level lock keeps each
/// dispatch single-owner.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting dispatch scheduler worker...");

    let runner = DispatchRunner::new(
        state.dispatch_repo.clone(),
        state.execution_log_repo.clone(),
        state.webhook_service.clone(),
        state.config.executor_id.clone(),
        state.config.batch_limit,
        state.config.lock_ttl_secs,
    );

    loop {
        let span = info_span!("dispatch_cycle", executor = %state.config.executor_id);

        async {
            match runner.run_once().await {
                Ok(report) => {
                    if report.processed > 0 {
                        info!(
                            "Cycle finished: processed={} cleaned_locks={}",
                            report.processed, report.cleaned_locks
                        );
                    }
                }
                Err(e) => error!("Dispatch cycle failed: {:?}", e),
            }
        }
        .instrument(span)
        .await;

        sleep(Duration::from_secs(state.config.worker_interval_secs)).await;
    }
}
