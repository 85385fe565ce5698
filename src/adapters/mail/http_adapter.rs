//! HTTP mail adapter. Implements MailGateway against a JSON mail-sending API.

use crate::domain::{DomainError, OutgoingMail};
use crate::ports::MailGateway;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Mail API adapter.
///
/// Posts `{"from", "to", "subject", "html"}` to `api_url` with a bearer token.
/// Any non-2xx response is a delivery failure for that message.
pub struct HttpMailAdapter {
    client: Arc<Client>,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailAdapter {
    /// Create a new mail adapter.
    ///
    /// # Arguments
    /// * `api_url` - Endpoint that accepts one message per POST
    /// * `api_key` - Bearer token for the endpoint
    /// * `from` - Sender address
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client: Arc::new(client),
            api_url,
            api_key,
            from,
        }
    }

    fn payload(&self, mail: &OutgoingMail) -> serde_json::Value {
        serde_json::json!({
            "from": self.from,
            "to": mail.to,
            "subject": mail.subject,
            "html": mail.html_body,
        })
    }
}

#[async_trait::async_trait]
impl MailGateway for HttpMailAdapter {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError> {
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.payload(mail))
            .send()
            .await
            .map_err(|e| DomainError::Delivery {
                recipient: mail.to.clone(),
                reason: format!("Request failed: {}", e),
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(DomainError::Delivery {
                recipient: mail.to.clone(),
                reason: format!("Mail API error {}: {}", status, text),
            });
        }

        info!(to = %mail.to, "email accepted by mail API");
        Ok(())
    }
}
