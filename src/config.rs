use std::env;
use uuid::Uuid;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub webhook_url: String,
    pub executor_id: String,
    pub batch_limit: i32,
    pub lock_ttl_secs: i64,
    pub webhook_timeout_secs: u64,
    pub worker_interval_secs: u64,
    pub test_group_id: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            webhook_url: env::var("WEBHOOK_URL").expect("WEBHOOK_URL must be set"),
            executor_id: env::var("EXECUTOR_ID")
                .unwrap_or_else(|_| format!("scheduler-{}", Uuid::new_v4())),
            batch_limit: env::var("DISPATCH_BATCH_LIMIT").unwrap_or_else(|_| "50".to_string())
                .parse().expect("DISPATCH_BATCH_LIMIT must be a number"),
            lock_ttl_secs: env::var("LOCK_TTL_SECS").unwrap_or_else(|_| "300".to_string())
                .parse().expect("LOCK_TTL_SECS must be a number"),
            webhook_timeout_secs: env::var("WEBHOOK_TIMEOUT_SECS").unwrap_or_else(|_| "15".to_string())
                .parse().expect("WEBHOOK_TIMEOUT_SECS must be a number"),
            worker_interval_secs: env::var("WORKER_INTERVAL_SECS").unwrap_or_else(|_| "60".to_string())
                .parse().expect("WORKER_INTERVAL_SECS must be a number"),
            test_group_id: env::var("TEST_GROUP_ID").unwrap_or_default(),
        }
    }
}
