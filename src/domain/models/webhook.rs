use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::models::dispatch::Dispatch;

/// Request body posted to the automation webhook. Field names keep the wire
/// format the downstream n8n flow expects.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WebhookPayload {
    #[serde(rename = "tipo")]
    pub kind: String, // "producao" | "teste"
    #[serde(rename = "disparo_id")]
    pub dispatch_id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "data")]
    pub date: String, // YYYY-MM-DD
    #[serde(rename = "hora")]
    pub time: String, // HH:MM
    pub timestamp: String, // ISO-8601
    #[serde(rename = "tem_media")]
    pub has_media: bool,
    #[serde(rename = "grupo_teste", skip_serializing_if = "Option::is_none")]
    pub test_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_execution: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaPayload>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaPayload {
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub caption: String,
}

impl WebhookPayload {
    /// Payload for a scheduler-driven production run.
    pub fn production(dispatch: &Dispatch, executor_id: &str) -> Self {
        Self {
            kind: "producao".to_string(),
            dispatch_id: dispatch.id.clone(),
            name: dispatch.name.clone(),
            message: dispatch.message.clone(),
            date: dispatch.scheduled_date.format("%Y-%m-%d").to_string(),
            time: dispatch.scheduled_time.clone(),
            timestamp: Utc::now().to_rfc3339(),
            has_media: dispatch.media_url.is_some(),
            test_group: None,
            scheduled_execution: Some(true),
            executor: Some(executor_id.to_string()),
            media: media_block(dispatch),
        }
    }

    /// Payload for a manual test send against the configured test group.
    pub fn test(dispatch: &Dispatch, test_group: &str) -> Self {
        Self {
            kind: "teste".to_string(),
            dispatch_id: dispatch.id.clone(),
            name: dispatch.name.clone(),
            message: dispatch.message.clone(),
            date: dispatch.scheduled_date.format("%Y-%m-%d").to_string(),
            time: dispatch.scheduled_time.clone(),
            timestamp: Utc::now().to_rfc3339(),
            has_media: dispatch.media_url.is_some(),
            test_group: Some(test_group.to_string()),
            scheduled_execution: None,
            executor: None,
            media: media_block(dispatch),
        }
    }
}

// Caption falls back to the message body when the stored caption is empty.
fn media_block(dispatch: &Dispatch) -> Option<MediaPayload> {
    dispatch.media_url.as_ref().map(|url| MediaPayload {
        url: url.clone(),
        media_type: dispatch.media_type.clone().unwrap_or_default(),
        caption: dispatch
            .media_caption
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&dispatch.message)
            .to_string(),
    })
}

/// Classified result of one webhook call. A non-2xx response is a normal
/// return with `success = false`; transport failures surface as `AppError`.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub status_code: u16,
    pub status_text: String,
}
