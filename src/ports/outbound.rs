//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    ArtifactId, CellAddress, CellValue, ContainerId, DomainError, Grid, OutgoingMail,
    ProvisioningRun,
};

/// File storage of the office suite: copy, rename and (re)parent artifacts.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Create a new, empty container. It starts inside the store's root.
    async fn create_container(&self, name: &str) -> Result<ContainerId, DomainError>;

    /// Copy `template_id` under `new_name` into `destination`. Returns the copy's id.
    ///
    /// Copies of documents with a bound form also copy that form, but the backend decides
    /// where the form copy lands and what it is called.
    async fn duplicate(
        &self,
        template_id: &ArtifactId,
        new_name: &str,
        destination: &ContainerId,
    ) -> Result<ArtifactId, DomainError>;

    /// Follow a document's back-reference to its bound form. `Ok(None)` when unbound.
    async fn resolve_companion_form(
        &self,
        document_id: &ArtifactId,
    ) -> Result<Option<ArtifactId>, DomainError>;

    async fn rename(&self, artifact_id: &ArtifactId, name: &str) -> Result<(), DomainError>;

    async fn add_to_container(
        &self,
        artifact_id: &ArtifactId,
        container: &ContainerId,
    ) -> Result<(), DomainError>;

    async fn remove_from_container(
        &self,
        artifact_id: &ArtifactId,
        container: &ContainerId,
    ) -> Result<(), DomainError>;

    /// Every container the artifact currently belongs to.
    async fn parents(&self, artifact_id: &ArtifactId) -> Result<Vec<ContainerId>, DomainError>;
}

/// Cell-level access to the sheets of a tabular document.
///
/// Missing documents are `NotFound`; missing sheets are `TargetMissing`.
#[async_trait::async_trait]
pub trait SheetStore: Send + Sync {
    async fn has_sheet(&self, document_id: &ArtifactId, sheet: &str) -> Result<bool, DomainError>;

    /// All populated rows of a sheet (the sheet's data range).
    async fn read_grid(&self, document_id: &ArtifactId, sheet: &str) -> Result<Grid, DomainError>;

    async fn read_cell(
        &self,
        document_id: &ArtifactId,
        sheet: &str,
        address: CellAddress,
    ) -> Result<CellValue, DomainError>;

    async fn write_cell(
        &self,
        document_id: &ArtifactId,
        sheet: &str,
        address: CellAddress,
        value: CellValue,
    ) -> Result<(), DomainError>;
}

/// Messaging gateway. Synchronous success/failure per message.
#[async_trait::async_trait]
pub trait MailGateway: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError>;
}

/// Durable record of the last provisioning run.
#[async_trait::async_trait]
pub trait RunManifestPort: Send + Sync {
    async fn load(&self) -> Result<Option<ProvisioningRun>, DomainError>;

    async fn save(&self, run: &ProvisioningRun) -> Result<(), DomainError>;
}
