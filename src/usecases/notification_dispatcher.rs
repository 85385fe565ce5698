//! Payment confirmation dispatch: scan the "Invoices paid" log -> render -> send -> flag.
//!
//! - Row 0 is the header; data rows are processed strictly in log order
//! - Rows without a recipient, or already flagged, are skipped
//! - The flag is written only after a successful send, and before the next row is read
//! - Delivery failures leave the flag unset so the next run retries the row

use crate::domain::{
    ArtifactId, CellValue, DomainError, MailDataLayout, MessageTemplate, PaymentLogSchema,
};
use crate::ports::{MailGateway, SheetStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// What to do when the gateway fails to deliver a row's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep scanning; report every failed row once the scan is done.
    #[default]
    ContinueAndAggregate,
    /// Stop at the first failed row.
    AbortOnFirst,
}

/// A row whose message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Zero-based grid row.
    pub row: usize,
    pub recipient: String,
    pub reason: String,
}

/// Result of one dispatch scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub already_notified: usize,
    pub skipped_blank: usize,
    pub failures: Vec<RowFailure>,
}

impl DispatchReport {
    /// `DispatchIncomplete` when any row failed, otherwise the report itself.
    pub fn into_result(self) -> Result<Self, DomainError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(DomainError::DispatchIncomplete {
                sent: self.sent,
                failed: self.failures.len(),
            })
        }
    }
}

/// Notification dispatcher.
pub struct NotificationDispatcher {
    sheets: Arc<dyn SheetStore>,
    mail: Arc<dyn MailGateway>,
    schema: PaymentLogSchema,
    layout: MailDataLayout,
    policy: FailurePolicy,
}

impl NotificationDispatcher {
    /// Validates the column schema up front; an inconsistent mapping is a `Schema` error.
    pub fn new(
        sheets: Arc<dyn SheetStore>,
        mail: Arc<dyn MailGateway>,
        schema: PaymentLogSchema,
        layout: MailDataLayout,
        policy: FailurePolicy,
    ) -> Result<Self, DomainError> {
        schema.validate()?;
        Ok(Self {
            sheets,
            mail,
            schema,
            layout,
            policy,
        })
    }

    /// Read subject and body from the template sheet of `document`.
    pub async fn load_template(&self, document: &ArtifactId) -> Result<MessageTemplate, DomainError> {
        let subject = self
            .sheets
            .read_cell(document, &self.layout.template_sheet, self.layout.subject_cell)
            .await?;
        let body = self
            .sheets
            .read_cell(document, &self.layout.template_sheet, self.layout.body_cell)
            .await?;
        if body.is_blank() {
            warn!(
                document = %document,
                cell = %self.layout.body_cell,
                "email body template is empty"
            );
        }
        Ok(MessageTemplate::new(subject.to_string(), body.to_string()))
    }

    /// Send a message for every pending row of the payment log in `document`.
    ///
    /// Storage errors (reading the log, writing a flag) abort the scan; flags already
    /// written stay written. Delivery errors follow the configured [`FailurePolicy`].
    pub async fn dispatch_pending(
        &self,
        document: &ArtifactId,
        template: &MessageTemplate,
    ) -> Result<DispatchReport, DomainError> {
        let sheet = self.layout.log_sheet.as_str();
        let grid = self.sheets.read_grid(document, sheet).await?;
        let mut report = DispatchReport::default();

        let Some(header) = grid.first() else {
            info!(document = %document, sheet, "payment log is empty");
            return Ok(report);
        };
        self.schema.check_header(header)?;

        for (index, cells) in grid.iter().enumerate().skip(1) {
            let row = self.schema.row(index, cells);
            if !row.has_recipient() {
                report.skipped_blank += 1;
                continue;
            }
            if row.is_notified() {
                report.already_notified += 1;
                continue;
            }

            let mail = template.render(&row);
            let outcome = self.mail.send(&mail).await;
            match outcome {
                Ok(()) => {
                    let flag = self.schema.flag_address(index);
                    self.sheets
                        .write_cell(document, sheet, flag, CellValue::Bool(true))
                        .await
                        .inspect_err(|e| {
                            error!(
                                row = index,
                                to = %mail.to,
                                cell = %flag,
                                error = %e,
                                "email sent but notified flag not written; row may be notified again"
                            )
                        })?;
                    report.sent += 1;
                    info!(row = index, to = %mail.to, cell = %flag, "payment confirmation sent");
                }
                Err(e) => {
                    warn!(row = index, to = %mail.to, error = %e, "payment confirmation failed");
                    if self.policy == FailurePolicy::AbortOnFirst {
                        return Err(e);
                    }
                    report.failures.push(RowFailure {
                        row: index,
                        recipient: mail.to,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            sent = report.sent,
            already_notified = report.already_notified,
            skipped_blank = report.skipped_blank,
            failed = report.failures.len(),
            "dispatch scan complete"
        );
        Ok(report)
    }

    /// Load the template and dispatch; failed rows turn into `DispatchIncomplete`.
    pub async fn run(&self, document: &ArtifactId) -> Result<DispatchReport, DomainError> {
        let template = self.load_template(document).await?;
        self.dispatch_pending(document, &template)
            .await?
            .into_result()
    }
}
