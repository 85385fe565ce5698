//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI invokes application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// First-time setup: create the workspace and provision every template.
    async fn run_provision(&self) -> Result<(), DomainError>;

    /// Send payment confirmations for pending rows of the payment log.
    async fn run_dispatch(&self) -> Result<(), DomainError>;

    /// Interactive menu offering the action that fits the workspace state.
    async fn run(&self) -> Result<(), DomainError>;
}
