//! Payment confirmation message template.

use crate::domain::{OutgoingMail, PaymentRow};
use serde::{Deserialize, Serialize};

pub const NAME_PLACEHOLDER: &str = "%name%";
pub const CURRENCY_PLACEHOLDER: &str = "%currency%";
pub const AMOUNT_PLACEHOLDER: &str = "%amount%";

/// Subject and HTML body with `%name%`, `%currency%` and `%amount%` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub subject: String,
    pub body: String,
}

impl MessageTemplate {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Substitutes name, currency, amount (in that order) into the body.
    /// Only the first occurrence of each placeholder is replaced; unknown ones stay verbatim.
    pub fn render_body(&self, name: &str, currency: &str, amount: &str) -> String {
        self.body
            .replacen(NAME_PLACEHOLDER, name, 1)
            .replacen(CURRENCY_PLACEHOLDER, currency, 1)
            .replacen(AMOUNT_PLACEHOLDER, amount, 1)
    }

    pub fn render(&self, row: &PaymentRow) -> OutgoingMail {
        OutgoingMail {
            to: row.recipient.to_string(),
            subject: self.subject.clone(),
            html_body: self.render_body(
                &row.name.to_string(),
                &row.currency.to_string(),
                &row.amount.to_string(),
            ),
        }
    }
}
