//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod message;
pub mod schema;

pub use entities::{
    ArtifactId, CellValue, ContainerId, Grid, OutgoingMail, PaymentRow, ProvisioningRun,
    TemplateEntry, TemplateKey, TemplateKind, TemplateRegistry,
};
pub use errors::DomainError;
pub use message::MessageTemplate;
pub use schema::{CellAddress, MailDataLayout, PaymentLogSchema, SettingsLayout};
