pub mod dispatch;
pub mod execution_log;
pub mod webhook;
