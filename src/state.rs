use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{DispatchRepository, ExecutionLogRepository, WebhookService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub dispatch_repo: Arc<dyn DispatchRepository>,
    pub execution_log_repo: Arc<dyn ExecutionLogRepository>,
    pub webhook_service: Arc<dyn WebhookService>,
}
