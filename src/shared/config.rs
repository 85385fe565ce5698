//! Application configuration. Template ids, paths, mail API, log layout.

use crate::domain::{
    ArtifactId, DomainError, MailDataLayout, PaymentLogSchema, SettingsLayout, TemplateEntry,
    TemplateKey, TemplateRegistry,
};
use crate::usecases::{FailurePolicy, WorkspaceNames};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "SUPPLIER_INVOICES";

pub const DEFAULT_CONTAINER_NAME: &str = "Supplier Invoices System";
pub const DEFAULT_DASHBOARD_NAME: &str = "Suppliers Invoices Dashboard";
pub const INVOICE_DATABASE_NAME: &str = "Invoice Database";
pub const INVOICE_FORM_NAME: &str = "Invoices Registration Form";
pub const SUPPLIER_DATABASE_NAME: &str = "Supplier Database";
pub const SUPPLIER_FORM_NAME: &str = "Supplier Registration Form";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub data_dir: Option<String>,
    /// Drive file of the local backend. Defaults to `<data_dir>/drive.json`.
    pub drive_file: Option<String>,
    /// Provisioning run manifest. Defaults to `<data_dir>/provisioning.json`.
    pub manifest_file: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Provisioning
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub container_name: Option<String>,

    #[serde(default)]
    pub dashboard_name: Option<String>,

    /// Invoice database template (has the invoice registration form bound).
    #[serde(default)]
    pub invoice_template_id: Option<String>,

    /// Supplier database template (has the supplier registration form bound).
    #[serde(default)]
    pub supplier_template_id: Option<String>,

    /// Host document adopted as the dashboard during setup.
    #[serde(default)]
    pub dashboard_id: Option<String>,

    #[serde(default)]
    pub settings_sheet: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────
    /// Document holding the payment log. Defaults to the dashboard of the last setup run.
    #[serde(default)]
    pub payment_log_id: Option<String>,

    #[serde(default)]
    pub log_sheet: Option<String>,

    #[serde(default)]
    pub template_sheet: Option<String>,

    /// Stop the scan at the first failed delivery instead of reporting failures at the end.
    #[serde(default)]
    pub abort_on_delivery_failure: Option<bool>,

    #[serde(default)]
    pub column_recipient: Option<usize>,
    #[serde(default)]
    pub column_name: Option<usize>,
    #[serde(default)]
    pub column_amount: Option<usize>,
    #[serde(default)]
    pub column_currency: Option<usize>,
    #[serde(default)]
    pub column_notified: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // Mail API
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub mail_api_url: Option<String>,

    #[serde(default)]
    pub mail_api_key: Option<String>,

    #[serde(default)]
    pub mail_from: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix(ENV_PREFIX));
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    pub fn drive_file_or_default(&self) -> PathBuf {
        self.drive_file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir_or_default().join("drive.json"))
    }

    pub fn manifest_file_or_default(&self) -> PathBuf {
        self.manifest_file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir_or_default().join("provisioning.json"))
    }

    pub fn workspace_names(&self) -> WorkspaceNames {
        WorkspaceNames {
            container: self
                .container_name
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string()),
            dashboard: self
                .dashboard_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DASHBOARD_NAME.to_string()),
        }
    }

    /// Both databases with their bound forms, invoice first.
    pub fn template_registry(&self) -> Result<TemplateRegistry, DomainError> {
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .map(ArtifactId::new)
                .ok_or_else(|| {
                    DomainError::Config(format!(
                        "Set {}_{} (env, .env or config file)",
                        ENV_PREFIX,
                        name.to_uppercase()
                    ))
                })
        };
        Ok(TemplateRegistry::new(vec![
            TemplateEntry::form(
                TemplateKey::InvoiceDatabase,
                required(&self.invoice_template_id, "invoice_template_id")?,
                INVOICE_DATABASE_NAME,
                INVOICE_FORM_NAME,
            ),
            TemplateEntry::form(
                TemplateKey::SupplierDatabase,
                required(&self.supplier_template_id, "supplier_template_id")?,
                SUPPLIER_DATABASE_NAME,
                SUPPLIER_FORM_NAME,
            ),
        ]))
    }

    pub fn dashboard_id(&self) -> Option<ArtifactId> {
        self.dashboard_id.clone().map(ArtifactId::new)
    }

    pub fn payment_log_id(&self) -> Option<ArtifactId> {
        self.payment_log_id.clone().map(ArtifactId::new)
    }

    pub fn settings_layout(&self) -> SettingsLayout {
        let mut layout = SettingsLayout::default();
        if let Some(sheet) = &self.settings_sheet {
            layout.sheet = sheet.clone();
        }
        layout
    }

    pub fn mail_layout(&self) -> MailDataLayout {
        let mut layout = MailDataLayout::default();
        if let Some(sheet) = &self.log_sheet {
            layout.log_sheet = sheet.clone();
        }
        if let Some(sheet) = &self.template_sheet {
            layout.template_sheet = sheet.clone();
        }
        layout
    }

    /// Column schema with per-field overrides. Not validated here; the dispatcher does that.
    pub fn payment_log_schema(&self) -> PaymentLogSchema {
        let d = PaymentLogSchema::default();
        PaymentLogSchema {
            recipient: self.column_recipient.unwrap_or(d.recipient),
            name: self.column_name.unwrap_or(d.name),
            amount: self.column_amount.unwrap_or(d.amount),
            currency: self.column_currency.unwrap_or(d.currency),
            notified: self.column_notified.unwrap_or(d.notified),
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.abort_on_delivery_failure.unwrap_or(false) {
            FailurePolicy::AbortOnFirst
        } else {
            FailurePolicy::ContinueAndAggregate
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mail Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub fn mail_api_url(&self) -> Option<String> {
        self.mail_api_url.clone()
    }

    pub fn mail_api_key(&self) -> Option<String> {
        self.mail_api_key.clone()
    }

    pub fn mail_from_or_default(&self) -> String {
        self.mail_from
            .clone()
            .unwrap_or_else(|| "no-reply@localhost".to_string())
    }

    /// Returns true if the HTTP mail API is fully configured.
    pub fn is_mail_configured(&self) -> bool {
        self.mail_api_url().is_some() && self.mail_api_key().is_some()
    }
}
