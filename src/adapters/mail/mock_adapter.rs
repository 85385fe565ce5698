//! Mock mail gateway for runs without a mail API.
//!
//! Logs every message instead of delivering it and keeps an in-memory outbox.

use crate::domain::{DomainError, OutgoingMail};
use crate::ports::MailGateway;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::info;

/// Mock mail adapter.
///
/// Records sent messages. Recipients registered with [`MockMailAdapter::failing_for`]
/// get a delivery error instead, which lets callers exercise retry paths.
#[derive(Default)]
pub struct MockMailAdapter {
    outbox: Mutex<Vec<OutgoingMail>>,
    failing: HashSet<String>,
}

impl MockMailAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that rejects mail for the given recipients.
    pub fn failing_for<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outbox: Mutex::new(Vec::new()),
            failing: recipients.into_iter().map(Into::into).collect(),
        }
    }

    /// Messages accepted so far, in send order.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl MailGateway for MockMailAdapter {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError> {
        if self.failing.contains(&mail.to) {
            return Err(DomainError::Delivery {
                recipient: mail.to.clone(),
                reason: "[MOCK] recipient configured to fail".to_string(),
            });
        }
        info!(
            to = %mail.to,
            subject = %mail.subject,
            body_len = mail.html_body.len(),
            "[MOCK] Simulating email delivery"
        );
        self.outbox
            .lock()
            .map_err(|e| DomainError::Delivery {
                recipient: mail.to.clone(),
                reason: e.to_string(),
            })?
            .push(mail.clone());
        Ok(())
    }
}
