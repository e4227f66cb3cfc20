use crate::domain::ports::ReminderService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Hands finished messages to the external SMS gateway. Delivery itself is
/// the gateway's problem; a failure here only fails the job that asked.
pub struct HttpReminderService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpReminderService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct SmsPayload {
    to_number: String,
    body: String,
}

#[async_trait]
impl ReminderService for HttpReminderService {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), AppError> {
        let payload = SmsPayload {
            to_number: recipient.to_string(),
            body: message.to_string(),
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Reminder service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Reminder service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
