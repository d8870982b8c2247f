use dispatch_backend::{
    api::router::create_router,
    config::Config,
    domain::models::dispatch::Dispatch,
    domain::models::webhook::{DeliveryOutcome, WebhookPayload},
    domain::ports::WebhookService,
    domain::services::dispatcher::DispatchRunner,
    error::AppError,
    infra::repositories::{
        sqlite_dispatch_repo::SqliteDispatchRepo,
        sqlite_execution_log_repo::SqliteExecutionLogRepo,
    },
    state::AppState,
};

use async_trait::async_trait;
use axum::Router;
use chrono::{Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use uuid::Uuid;

#[allow(dead_code)]
pub enum MockOutcome {
    Http(u16),
    NetworkError,
}

/// Records every delivered payload and answers with a configurable outcome
/// per dispatch id (HTTP 200 by default).
pub struct MockWebhookService {
    outcomes: Mutex<HashMap<String, MockOutcome>>,
    pub deliveries: Mutex<Vec<WebhookPayload>>,
}

impl MockWebhookService {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(HashMap::new()),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn set_outcome(&self, dispatch_id: &str, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().insert(dispatch_id.to_string(), outcome);
    }

    #[allow(dead_code)]
    pub fn delivered(&self) -> Vec<WebhookPayload> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookService for MockWebhookService {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<DeliveryOutcome, AppError> {
        self.deliveries.lock().unwrap().push(payload.clone());

        match self.outcomes.lock().unwrap().get(&payload.dispatch_id) {
            Some(MockOutcome::Http(code)) => Ok(DeliveryOutcome {
                success: (200..300).contains(code),
                status_code: *code,
                status_text: String::new(),
            }),
            Some(MockOutcome::NetworkError) => Err(AppError::Webhook(
                "Webhook connection error: connection refused".to_string(),
            )),
            None => Ok(DeliveryOutcome {
                success: true,
                status_code: 200,
                status_text: "OK".to_string(),
            }),
        }
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub webhook: Arc<MockWebhookService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(StdDuration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url,
            port: 0,
            webhook_url: "http://localhost/webhook".to_string(),
            executor_id: "test-executor".to_string(),
            batch_limit: 50,
            lock_ttl_secs: 300,
            webhook_timeout_secs: 5,
            worker_interval_secs: 60,
            test_group_id: "test-group@g.us".to_string(),
        };

        let webhook = Arc::new(MockWebhookService::new());

        let state = Arc::new(AppState {
            config,
            dispatch_repo: Arc::new(SqliteDispatchRepo::new(pool.clone())),
            execution_log_repo: Arc::new(SqliteExecutionLogRepo::new(pool.clone())),
            webhook_service: webhook.clone(),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            webhook,
        }
    }

    pub fn runner(&self) -> DispatchRunner {
        DispatchRunner::new(
            self.state.dispatch_repo.clone(),
            self.state.execution_log_repo.clone(),
            self.state.webhook_service.clone(),
            self.state.config.executor_id.clone(),
            self.state.config.batch_limit,
            self.state.config.lock_ttl_secs,
        )
    }

    /// A dispatch whose scheduled time passed an hour ago.
    #[allow(dead_code)]
    pub fn due_dispatch(&self, name: &str) -> Dispatch {
        let due = Utc::now() - Duration::hours(1);
        Dispatch::new(
            name,
            "Hello from the scheduler",
            due.date_naive(),
            &due.format("%H:%M").to_string(),
        )
    }

    /// Rows normally come from the (out of scope) CRUD surface, so tests
    /// seed them straight into the store.
    pub async fn insert_dispatch(&self, dispatch: &Dispatch) {
        sqlx::query(
            r#"
            INSERT INTO dispatches
                (id, name, message, scheduled_date, scheduled_time,
                 media_url, media_type, media_caption, status,
                 execution_attempts, error_message, locked_by, locked_until,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&dispatch.id)
        .bind(&dispatch.name)
        .bind(&dispatch.message)
        .bind(dispatch.scheduled_date)
        .bind(&dispatch.scheduled_time)
        .bind(&dispatch.media_url)
        .bind(&dispatch.media_type)
        .bind(&dispatch.media_caption)
        .bind(&dispatch.status)
        .bind(dispatch.execution_attempts)
        .bind(&dispatch.error_message)
        .bind(&dispatch.locked_by)
        .bind(dispatch.locked_until)
        .bind(dispatch.created_at)
        .bind(dispatch.updated_at)
        .execute(&self.pool)
        .await
        .expect("Failed to seed dispatch");
    }

    #[allow(dead_code)]
    pub async fn dispatch_status(&self, dispatch_id: &str) -> String {
        sqlx::query_scalar("SELECT status FROM dispatches WHERE id = ?")
            .bind(dispatch_id)
            .fetch_one(&self.pool)
            .await
            .expect("Dispatch not found")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
