use crate::domain::models::webhook::{DeliveryOutcome, WebhookPayload};
use crate::domain::ports::WebhookService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

pub struct HttpWebhookService {
    client: Client,
    webhook_url: String,
}

impl HttpWebhookService {
    pub fn new(webhook_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build webhook HTTP client");
        Self { client, webhook_url }
    }
}

#[async_trait]
impl WebhookService for HttpWebhookService {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<DeliveryOutcome, AppError> {
        let response = self.client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::Webhook(format!("Webhook connection error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            // Best-effort second attempt. Its outcome is never observed and
            // never counts as confirmation of success.
            if let Err(e) = self.client
                .post(&self.webhook_url)
                .json(payload)
                .send()
                .await
            {
                warn!("Fallback webhook attempt failed: {}", e);
            }
        }

        Ok(DeliveryOutcome {
            success: status.is_success(),
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
        })
    }
}
