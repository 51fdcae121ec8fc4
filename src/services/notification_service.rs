use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::application::ApplicationRecord;
use crate::models::status::ApplicationStatus;

pub const STATUS_CHANGED_EVENT: &str = "application_status_changed";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusNotifier: Send + Sync + 'static {
    async fn notify(&self, application: &ApplicationRecord, new_status: ApplicationStatus) -> Result<()>;
}

/// Posts status changes to an external mailer or webhook endpoint.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    target_url: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(target_url: String, secret: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            target_url,
            secret,
        }
    }
}

#[async_trait]
impl StatusNotifier for WebhookNotifier {
    async fn notify(&self, application: &ApplicationRecord, new_status: ApplicationStatus) -> Result<()> {
        let payload = json!({
            "event": STATUS_CHANGED_EVENT,
            "application_id": application.id,
            "email": application.email,
            "name": application.name,
            "status": new_status,
            "timestamp": chrono::Utc::now(),
        });

        let mut request = self.client.post(&self.target_url).json(&payload);
        if let Some(secret) = &self.secret {
            request = request.header("X-Webhook-Secret", secret);
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "Notification webhook returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}

/// Used when no webhook is configured.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl StatusNotifier for LogNotifier {
    async fn notify(&self, application: &ApplicationRecord, new_status: ApplicationStatus) -> Result<()> {
        tracing::info!(
            application_id = %application.id,
            email = %application.email,
            status = %new_status,
            "Application status notification"
        );
        Ok(())
    }
}
