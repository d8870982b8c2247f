pub mod postgres_dispatch_repo;
pub mod postgres_execution_log_repo;
pub mod sqlite_dispatch_repo;
pub mod sqlite_execution_log_repo;
