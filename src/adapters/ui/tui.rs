//! Implements InputPort. Inquire-based interactive prompts.
//!
//! The menu mirrors the workspace state: setup before provisioning, notifications after.

use crate::domain::{ArtifactId, DomainError, ProvisioningRun, TemplateKey, TemplateRegistry};
use crate::ports::{InputPort, RunManifestPort};
use crate::usecases::{NotificationDispatcher, SetupService};
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::{Confirm, Select};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Applies the prompt theme globally. Call once before the first prompt.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightMagenta))
        .with_highlighted_option_prefix(Styled::new("▸").with_fg(Color::LightCyan))
        .with_selected_option(Some(StyleSheet::new().with_fg(Color::LightCyan)));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    CreateSystem,
    SendPaymentEmails,
    Exit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuAction::CreateSystem => f.write_str("Create Supplier System"),
            MenuAction::SendPaymentEmails => f.write_str("Send Payment Done Email"),
            MenuAction::Exit => f.write_str("Exit"),
        }
    }
}

/// Actions offered for the current workspace state.
fn menu_for(provisioned: bool) -> Vec<MenuAction> {
    if provisioned {
        vec![MenuAction::SendPaymentEmails, MenuAction::Exit]
    } else {
        vec![MenuAction::CreateSystem, MenuAction::Exit]
    }
}

/// Picks the payment log document: explicit config wins, then the last run's dashboard.
fn payment_log_document(
    configured: Option<&ArtifactId>,
    run: Option<&ProvisioningRun>,
) -> Result<ArtifactId, DomainError> {
    configured
        .cloned()
        .or_else(|| run.and_then(|r| r.dashboard_id.clone()))
        .ok_or_else(|| {
            DomainError::Config(
                "no payment log document: run setup with a dashboard or set SUPPLIER_INVOICES_PAYMENT_LOG_ID"
                    .into(),
            )
        })
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    setup: Arc<SetupService>,
    dispatcher: Arc<NotificationDispatcher>,
    manifest: Arc<dyn RunManifestPort>,
    /// Config error message when template ids are missing; only setup needs them.
    registry: Result<TemplateRegistry, String>,
    dashboard: Option<ArtifactId>,
    payment_log: Option<ArtifactId>,
    /// Skip the confirmation before setting up a second workspace.
    assume_yes: bool,
}

impl TuiInputPort {
    pub fn new(
        setup: Arc<SetupService>,
        dispatcher: Arc<NotificationDispatcher>,
        manifest: Arc<dyn RunManifestPort>,
        registry: Result<TemplateRegistry, DomainError>,
        dashboard: Option<ArtifactId>,
        payment_log: Option<ArtifactId>,
    ) -> Self {
        Self {
            setup,
            dispatcher,
            manifest,
            registry: registry.map_err(|e| match e {
                DomainError::Config(message) => message,
                other => other.to_string(),
            }),
            dashboard,
            payment_log,
            assume_yes: false,
        }
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    fn confirm_second_setup(&self, previous: &ProvisioningRun) -> Result<bool, DomainError> {
        warn!(
            container = %previous.container,
            completed_at = ?previous.completed_at,
            "a workspace was already provisioned; setup is not idempotent"
        );
        if self.assume_yes {
            return Ok(true);
        }
        Confirm::new("A supplier system already exists. Create another copy of every template?")
            .with_default(false)
            .prompt()
            .map_err(|e| DomainError::Ui(e.to_string()))
    }

    fn print_run(run: &ProvisioningRun) {
        println!("Workspace container: {}", run.container);
        if let Some(dashboard) = &run.dashboard_id {
            println!("  Dashboard: {}", dashboard);
        }
        for key in [TemplateKey::InvoiceDatabase, TemplateKey::SupplierDatabase] {
            if let Some(entry) = run.entry(key) {
                let doc = entry.assigned_id.as_ref().map(|i| i.as_str()).unwrap_or("-");
                let form = entry
                    .assigned_form_id
                    .as_ref()
                    .map(|i| i.as_str())
                    .unwrap_or("-");
                println!("  {}: {} (form {})", entry.display_name, doc, form);
            }
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run_provision(&self) -> Result<(), DomainError> {
        let registry = self.registry.clone().map_err(DomainError::Config)?;
        if let Some(previous) = self.manifest.load().await? {
            if previous.is_complete() && !self.confirm_second_setup(&previous)? {
                info!("setup cancelled");
                return Ok(());
            }
        }

        let run = self.setup.run(&registry, self.dashboard.as_ref()).await?;
        self.manifest.save(&run).await?;
        Self::print_run(&run);
        Ok(())
    }

    async fn run_dispatch(&self) -> Result<(), DomainError> {
        let previous = self.manifest.load().await?;
        let document = payment_log_document(self.payment_log.as_ref(), previous.as_ref())?;
        let report = self.dispatcher.run(&document).await?;
        println!(
            "Sent {} payment confirmation(s); {} already notified, {} blank row(s) skipped.",
            report.sent, report.already_notified, report.skipped_blank
        );
        Ok(())
    }

    async fn run(&self) -> Result<(), DomainError> {
        let provisioned = self
            .manifest
            .load()
            .await?
            .is_some_and(|run| run.is_complete());
        let action = Select::new("Suppliers", menu_for(provisioned))
            .prompt()
            .map_err(|e| DomainError::Ui(e.to_string()))?;
        match action {
            MenuAction::CreateSystem => self.run_provision().await,
            MenuAction::SendPaymentEmails => self.run_dispatch().await,
            MenuAction::Exit => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContainerId;

    #[test]
    fn test_menu_follows_provisioning_state() {
        assert_eq!(menu_for(false)[0], MenuAction::CreateSystem);
        assert_eq!(menu_for(true)[0], MenuAction::SendPaymentEmails);
    }

    #[test]
    fn test_payment_log_prefers_configured_document() {
        let mut run = ProvisioningRun::start(ContainerId::new("c"));
        run.dashboard_id = Some(ArtifactId::new("dash"));
        let configured = ArtifactId::new("log");

        assert_eq!(
            payment_log_document(Some(&configured), Some(&run)).unwrap(),
            configured
        );
        assert_eq!(
            payment_log_document(None, Some(&run)).unwrap(),
            ArtifactId::new("dash")
        );
        assert!(matches!(
            payment_log_document(None, None),
            Err(DomainError::Config(_))
        ));
    }
}
