use reqwest::Client;
use serde_json::json;

use crate::errors::{AppError, Result};

const EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// Outbound email via a hosted transactional-email HTTP API.
#[derive(Clone)]
pub struct EmailService {
    api_key: String,
    from: String,
    client: Client,
}

impl EmailService {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            api_key,
            from,
            client: Client::new(),
        }
    }

    pub async fn send_recovery_code(&self, to: &str, code: &str, recovery_link: &str) -> Result<()> {
        if self.api_key.is_empty() {
            // Local/dev setups run without an email provider
            tracing::warn!("Email delivery disabled (EMAIL_API_KEY not set), skipping send to {}", to);
            return Ok(());
        }

        let message = format!(
            "Your Rawdati password reset code is: {}. Valid for 5 minutes.\n\n\
             Or open this link to set a new password directly:\n{}",
            code, recovery_link
        );

        let response = self
            .client
            .post(EMAIL_API_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [to],
                "subject": "Rawdati password reset",
                "text": message,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Email API error: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::ExternalApi(format!(
                "Email sending failed with status: {}",
                response.status()
            )))
        }
    }
}
