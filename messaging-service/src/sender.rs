use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use crate::config::WhatsAppConfig;
use crate::error::{MessagingError, MessagingResult};

/// Outbound message transport.
///
/// `to` is an E.164 phone number, `body` the message text.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> MessagingResult<()>;
}

/// WhatsApp Business API transport
pub struct WhatsAppSender {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

impl WhatsAppSender {
    pub fn new(config: WhatsAppConfig) -> MessagingResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| MessagingError::SendFailed(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    async fn send(&self, to: &str, body: &str) -> MessagingResult<()> {
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": body },
        });

        let response = self
            .client
            .post(format!("{}/messages", self.config.api_url))
            .bearer_auth(&self.config.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MessagingError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MessagingError::SendFailed(format!(
                "WhatsApp API returned {status}: {detail}"
            )));
        }

        Ok(())
    }
}

/// Fallback transport for deployments without WhatsApp credentials.
/// Logs the delivery instead of performing it.
pub struct LogOnlySender;

#[async_trait]
impl MessageSender for LogOnlySender {
    async fn send(&self, _to: &str, _body: &str) -> MessagingResult<()> {
        warn!("WhatsApp transport not configured; message delivery skipped");
        Ok(())
    }
}
