use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_SENT: &str = "sent";

/// A scheduled message dispatch. Rows are created and edited by the
/// (external) CRUD surface; the dispatcher only reads scheduling fields and
/// transitions `status` / `execution_attempts` through the completion call.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Dispatch {
    pub id: String,
    pub name: String,
    pub message: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String, // "HH:MM"
    pub media_url: Option<String>,
    pub media_type: Option<String>, // "image" | "video" | "audio" | "document"
    pub media_caption: Option<String>,
    pub status: String, // "draft" | "scheduled" | "sent"
    pub execution_attempts: i32,
    pub error_message: Option<String>,
    pub locked_by: Option<String>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dispatch {
    pub fn new(name: &str, message: &str, scheduled_date: NaiveDate, scheduled_time: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            message: message.to_string(),
            scheduled_date,
            scheduled_time: scheduled_time.to_string(),
            media_url: None,
            media_type: None,
            media_caption: None,
            status: STATUS_SCHEDULED.to_string(),
            execution_attempts: 0,
            error_message: None,
            locked_by: None,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }
}
