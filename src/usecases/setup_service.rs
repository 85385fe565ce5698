//! First-time setup: container -> dashboard -> templates -> cross-references.
//!
//! Threads a `ProvisioningRun` through each step and returns it; nothing global is mutated.
//! A failed step does not roll back what was already created.

use crate::domain::{
    ArtifactId, ContainerId, DomainError, ProvisioningRun, SettingsLayout, TemplateKey,
    TemplateRegistry,
};
use crate::ports::{ArtifactStore, ProgressPort, SheetStore};
use crate::usecases::cross_reference::{CrossLink, CrossReferenceWriter};
use crate::usecases::provisioner::DocumentProvisioner;
use crate::usecases::workspace_organizer::WorkspaceOrganizer;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

/// Display names used for the workspace itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceNames {
    pub container: String,
    pub dashboard: String,
}

/// Setup service. Builds the whole linked workspace in one run.
pub struct SetupService {
    store: Arc<dyn ArtifactStore>,
    organizer: Arc<WorkspaceOrganizer>,
    provisioner: DocumentProvisioner,
    cross_references: CrossReferenceWriter,
    progress: Arc<dyn ProgressPort>,
    settings: SettingsLayout,
    names: WorkspaceNames,
}

impl SetupService {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        sheets: Arc<dyn SheetStore>,
        progress: Arc<dyn ProgressPort>,
        settings: SettingsLayout,
        names: WorkspaceNames,
    ) -> Self {
        let organizer = Arc::new(WorkspaceOrganizer::new(Arc::clone(&store)));
        let provisioner = DocumentProvisioner::new(
            Arc::clone(&store),
            Arc::clone(&organizer),
            Arc::clone(&progress),
        );
        Self {
            store,
            organizer,
            provisioner,
            cross_references: CrossReferenceWriter::new(sheets),
            progress,
            settings,
            names,
        }
    }

    /// Run setup. `dashboard` is the host document that will hold the payment log; it is
    /// renamed and moved into the new container rather than copied.
    pub async fn run(
        &self,
        registry: &TemplateRegistry,
        dashboard: Option<&ArtifactId>,
    ) -> Result<ProvisioningRun, DomainError> {
        self.progress
            .notify("Creating & configuring the supplier system. Please wait...");

        let container = self.store.create_container(&self.names.container).await?;
        info!(container = %container, name = %self.names.container, "created workspace container");
        let mut run = ProvisioningRun::start(container);

        match self.provision_all(&mut run, registry, dashboard).await {
            Ok(()) => {
                run.completed_at = Some(Utc::now());
                self.progress.finish("Supplier system ready");
                info!(container = %run.container, "setup complete");
                Ok(run)
            }
            Err(e) => {
                let created: Vec<&str> = run
                    .entries
                    .iter()
                    .flat_map(|entry| [entry.assigned_id.as_ref(), entry.assigned_form_id.as_ref()])
                    .flatten()
                    .map(|id| id.as_str())
                    .collect();
                error!(
                    container = %run.container,
                    created = ?created,
                    error = %e,
                    "setup aborted; created artifacts were left in place"
                );
                self.progress.finish("Setup failed");
                Err(e)
            }
        }
    }

    async fn provision_all(
        &self,
        run: &mut ProvisioningRun,
        registry: &TemplateRegistry,
        dashboard: Option<&ArtifactId>,
    ) -> Result<(), DomainError> {
        if let Some(dashboard) = dashboard {
            self.adopt_dashboard(dashboard, &run.container).await?;
            run.dashboard_id = Some(dashboard.clone());
        }

        for entry in registry.entries() {
            let provisioned = self.provisioner.provision(entry, &run.container).await?;
            run.record(provisioned);
        }

        self.link_forms(run).await
    }

    async fn adopt_dashboard(
        &self,
        dashboard: &ArtifactId,
        container: &ContainerId,
    ) -> Result<(), DomainError> {
        self.progress.notify("Moving the dashboard into the workspace...");
        self.store.rename(dashboard, &self.names.dashboard).await?;
        self.organizer.relocate(dashboard, container).await?;
        info!(dashboard = %dashboard, "dashboard adopted");
        Ok(())
    }

    /// Store both form ids in the supplier database's settings sheet.
    async fn link_forms(&self, run: &ProvisioningRun) -> Result<(), DomainError> {
        let target = run
            .entry(TemplateKey::SupplierDatabase)
            .and_then(|e| e.assigned_id.as_ref())
            .ok_or_else(|| {
                DomainError::Config("registry has no supplier database to hold form ids".into())
            })?;
        let form = |key: TemplateKey| {
            run.form_id(key)
                .cloned()
                .ok_or_else(|| DomainError::Config(format!("{} has no companion form", key)))
        };
        let links = [
            CrossLink::new(
                self.settings.invoice_form_cell,
                form(TemplateKey::InvoiceDatabase)?,
            ),
            CrossLink::new(
                self.settings.supplier_form_cell,
                form(TemplateKey::SupplierDatabase)?,
            ),
        ];

        self.progress.notify("Recording form ids...");
        self.cross_references
            .write_links(target, &self.settings.sheet, &links)
            .await
    }
}
