//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// A template or artifact identifier does not resolve.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The companion form of a duplicated document could not be located.
    #[error("Companion form resolution failed: {0}")]
    LinkResolution(String),

    /// A configuration write target (document, sheet or cell) is absent.
    #[error("Write target missing: {0}")]
    TargetMissing(String),

    /// The messaging gateway rejected or failed to deliver a message.
    #[error("Delivery to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },

    /// Dispatch scan finished but some rows could not be delivered.
    /// Their flags stay unset so the next run retries them.
    #[error("Dispatch incomplete: {sent} sent, {failed} failed")]
    DispatchIncomplete { sent: usize, failed: usize },

    #[error("Template entry already provisioned: {0}")]
    AlreadyProvisioned(String),

    #[error("Payment log schema error: {0}")]
    Schema(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("UI error: {0}")]
    Ui(String),
}
