//! Application use cases. Orchestrate domain logic via ports.

pub mod cross_reference;
pub mod notification_dispatcher;
pub mod provisioner;
pub mod setup_service;
pub mod workspace_organizer;

pub use cross_reference::{CrossLink, CrossReferenceWriter};
pub use notification_dispatcher::{
    DispatchReport, FailurePolicy, NotificationDispatcher, RowFailure,
};
pub use provisioner::DocumentProvisioner;
pub use setup_service::{SetupService, WorkspaceNames};
pub use workspace_organizer::WorkspaceOrganizer;
