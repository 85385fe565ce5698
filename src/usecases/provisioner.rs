//! Document provisioning: duplicate a template, claim its companion form, place both.
//!
//! - Duplicates under the entry's display name and records the copy's id
//! - For form-backed templates, resolves the bound form copy, renames and relocates it
//! - Returns a new entry; the caller's entry is never mutated, so a failed step leaves it unassigned

use crate::domain::{ArtifactId, ContainerId, DomainError, TemplateEntry, TemplateKind};
use crate::ports::{ArtifactStore, ProgressPort};
use crate::usecases::workspace_organizer::WorkspaceOrganizer;
use std::sync::Arc;
use tracing::{error, info};

/// Document provisioner. Produces placed copies of registry templates.
pub struct DocumentProvisioner {
    store: Arc<dyn ArtifactStore>,
    organizer: Arc<WorkspaceOrganizer>,
    progress: Arc<dyn ProgressPort>,
}

impl DocumentProvisioner {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        organizer: Arc<WorkspaceOrganizer>,
        progress: Arc<dyn ProgressPort>,
    ) -> Self {
        Self {
            store,
            organizer,
            progress,
        }
    }

    /// Provision one entry into `container`. Returns the entry with `assigned_id` set
    /// (and `assigned_form_id` for form-backed entries).
    ///
    /// Entries that already carry an `assigned_id` are refused: provisioning is not idempotent.
    pub async fn provision(
        &self,
        entry: &TemplateEntry,
        container: &ContainerId,
    ) -> Result<TemplateEntry, DomainError> {
        if let Some(existing) = &entry.assigned_id {
            return Err(DomainError::AlreadyProvisioned(format!(
                "{} (copy {})",
                entry.display_name, existing
            )));
        }

        self.progress
            .notify(&format!("Creating {}...", entry.display_name));

        let copy_id = self
            .store
            .duplicate(&entry.template_id, &entry.display_name, container)
            .await?;
        self.organizer.relocate(&copy_id, container).await?;

        let mut provisioned = entry.clone();
        provisioned.assigned_id = Some(copy_id.clone());

        if entry.kind == TemplateKind::Form {
            let form_name = entry
                .form_display_name
                .as_deref()
                .unwrap_or(&entry.display_name);
            let form_id = self
                .claim_companion_form(&copy_id, form_name, container)
                .await
                .inspect_err(|e| {
                    error!(
                        key = %entry.key,
                        copy_id = %copy_id,
                        error = %e,
                        "companion form not claimed; document copy left in place"
                    )
                })?;
            provisioned.assigned_form_id = Some(form_id);
        }

        info!(
            key = %entry.key,
            template_id = %entry.template_id,
            copy_id = %copy_id,
            form_id = ?provisioned.assigned_form_id.as_ref().map(|f| f.as_str()),
            "provisioned template"
        );
        Ok(provisioned)
    }

    /// Second half of duplicating a form-backed document: find the form copy the store
    /// made alongside it, then name and place it like the document.
    async fn claim_companion_form(
        &self,
        document_id: &ArtifactId,
        form_name: &str,
        container: &ContainerId,
    ) -> Result<ArtifactId, DomainError> {
        let form_id = self
            .store
            .resolve_companion_form(document_id)
            .await
            .map_err(|e| DomainError::LinkResolution(format!("{}: {}", document_id, e)))?
            .ok_or_else(|| {
                DomainError::LinkResolution(format!("no form bound to document {}", document_id))
            })?;

        self.store.rename(&form_id, form_name).await?;
        self.organizer.relocate(&form_id, container).await?;
        Ok(form_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::local_drive::LocalDrive;
    use crate::domain::TemplateKey;
    use crate::ports::SilentProgress;

    struct Fixture {
        drive: Arc<LocalDrive>,
        provisioner: DocumentProvisioner,
        container: ContainerId,
    }

    async fn fixture() -> Fixture {
        let drive = Arc::new(LocalDrive::in_memory());
        let store = Arc::clone(&drive) as Arc<dyn ArtifactStore>;
        let organizer = Arc::new(WorkspaceOrganizer::new(Arc::clone(&store)));
        let provisioner = DocumentProvisioner::new(store, organizer, Arc::new(SilentProgress));
        let container = drive.create_container("Workspace").await.unwrap();
        Fixture {
            drive,
            provisioner,
            container,
        }
    }

    #[tokio::test]
    async fn test_provision_form_entry_claims_companion() {
        let f = fixture().await;
        let template = f.drive.insert_spreadsheet("Template", vec![]).await.unwrap();
        f.drive.insert_bound_form(&template, "Template form").await.unwrap();
        let entry = TemplateEntry::form(
            TemplateKey::InvoiceDatabase,
            template,
            "Invoice Database",
            "Invoices Registration Form",
        );

        let done = f.provisioner.provision(&entry, &f.container).await.unwrap();

        let doc = done.assigned_id.clone().unwrap();
        let form = done.assigned_form_id.clone().unwrap();
        assert_eq!(f.drive.artifact_name(&doc).await.unwrap(), "Invoice Database");
        assert_eq!(
            f.drive.artifact_name(&form).await.unwrap(),
            "Invoices Registration Form"
        );
        assert_eq!(f.drive.parents(&doc).await.unwrap(), vec![f.container.clone()]);
        assert_eq!(f.drive.parents(&form).await.unwrap(), vec![f.container.clone()]);
        assert!(!entry.is_provisioned());
    }

    #[tokio::test]
    async fn test_provision_collection_entry_has_no_form() {
        let f = fixture().await;
        let template = f.drive.insert_spreadsheet("Template", vec![]).await.unwrap();
        let entry =
            TemplateEntry::collection(TemplateKey::InvoiceDatabase, template, "Invoice Database");

        let done = f.provisioner.provision(&entry, &f.container).await.unwrap();
        assert!(done.assigned_id.is_some());
        assert!(done.assigned_form_id.is_none());
    }

    #[tokio::test]
    async fn test_provision_unknown_template_is_not_found() {
        let f = fixture().await;
        let entry = TemplateEntry::form(
            TemplateKey::SupplierDatabase,
            ArtifactId::new("does-not-exist"),
            "Supplier Database",
            "Supplier Registration Form",
        );

        let err = f.provisioner.provision(&entry, &f.container).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(entry.assigned_id.is_none());
        assert!(f.drive.children(&f.container).await.is_empty());
    }

    #[tokio::test]
    async fn test_provision_form_entry_without_bound_form_fails() {
        let f = fixture().await;
        let template = f.drive.insert_spreadsheet("Template", vec![]).await.unwrap();
        let entry = TemplateEntry::form(
            TemplateKey::SupplierDatabase,
            template,
            "Supplier Database",
            "Supplier Registration Form",
        );

        let err = f.provisioner.provision(&entry, &f.container).await.unwrap_err();
        assert!(matches!(err, DomainError::LinkResolution(_)));
        // No rollback: the document copy stays in the workspace.
        assert_eq!(f.drive.children(&f.container).await.len(), 1);
    }

    #[tokio::test]
    async fn test_provision_refuses_already_assigned_entry() {
        let f = fixture().await;
        let template = f.drive.insert_spreadsheet("Template", vec![]).await.unwrap();
        let entry =
            TemplateEntry::collection(TemplateKey::InvoiceDatabase, template, "Invoice Database");
        let done = f.provisioner.provision(&entry, &f.container).await.unwrap();

        let err = f.provisioner.provision(&done, &f.container).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyProvisioned(_)));
        assert_eq!(f.drive.children(&f.container).await.len(), 1);
    }
}
