//! Domain entities. Pure data structures for the core business.
//!
//! No storage/mail types here — these are mapped from adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a file-like artifact (spreadsheet or form) in the artifact store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a container (folder) in the artifact store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a template is a tabular document with a bound companion form, or a plain one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Form,
    DocumentCollection,
}

/// Stable key of a registry entry. Used to look entries up in a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKey {
    InvoiceDatabase,
    SupplierDatabase,
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::InvoiceDatabase => f.write_str("invoice_database"),
            TemplateKey::SupplierDatabase => f.write_str("supplier_database"),
        }
    }
}

/// A template in the catalog plus the identifiers assigned once copies exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub key: TemplateKey,
    pub kind: TemplateKind,
    pub template_id: ArtifactId,
    pub display_name: String,
    /// Name for the companion form. Only meaningful for `TemplateKind::Form`.
    #[serde(default)]
    pub form_display_name: Option<String>,
    #[serde(default)]
    pub assigned_id: Option<ArtifactId>,
    #[serde(default)]
    pub assigned_form_id: Option<ArtifactId>,
}

impl TemplateEntry {
    /// Entry for a document with a bound companion form.
    pub fn form(
        key: TemplateKey,
        template_id: ArtifactId,
        display_name: impl Into<String>,
        form_display_name: impl Into<String>,
    ) -> Self {
        Self {
            key,
            kind: TemplateKind::Form,
            template_id,
            display_name: display_name.into(),
            form_display_name: Some(form_display_name.into()),
            assigned_id: None,
            assigned_form_id: None,
        }
    }

    /// Entry for a plain tabular document.
    pub fn collection(
        key: TemplateKey,
        template_id: ArtifactId,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            key,
            kind: TemplateKind::DocumentCollection,
            template_id,
            display_name: display_name.into(),
            form_display_name: None,
            assigned_id: None,
            assigned_form_id: None,
        }
    }

    pub fn is_provisioned(&self) -> bool {
        self.assigned_id.is_some()
    }
}

/// Static catalog of templates. Read-only; provisioning never mutates it.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: Vec<TemplateEntry>,
}

impl TemplateRegistry {
    pub fn new(entries: Vec<TemplateEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn get(&self, key: TemplateKey) -> Option<&TemplateEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Outcome of a setup run. Threaded through each provisioning step and saved afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningRun {
    pub container: ContainerId,
    #[serde(default)]
    pub dashboard_id: Option<ArtifactId>,
    #[serde(default)]
    pub entries: Vec<TemplateEntry>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProvisioningRun {
    pub fn start(container: ContainerId) -> Self {
        Self {
            container,
            dashboard_id: None,
            entries: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn entry(&self, key: TemplateKey) -> Option<&TemplateEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Records a provisioned entry, replacing any previous record with the same key.
    pub fn record(&mut self, entry: TemplateEntry) {
        self.entries.retain(|e| e.key != entry.key);
        self.entries.push(entry);
    }

    pub fn form_id(&self, key: TemplateKey) -> Option<&ArtifactId> {
        self.entry(key).and_then(|e| e.assigned_form_id.as_ref())
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// One spreadsheet cell value as the tabular store reports it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Spreadsheet-style truthiness: `true`, a non-zero number or non-empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Empty => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Rectangular-ish cell grid. Rows may be ragged; missing cells read as empty.
pub type Grid = Vec<Vec<CellValue>>;

/// One data row of the payment log, already mapped through the column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    /// Zero-based position in the grid (header is 0).
    pub index: usize,
    pub recipient: CellValue,
    pub name: CellValue,
    pub amount: CellValue,
    pub currency: CellValue,
    pub notified: CellValue,
}

impl PaymentRow {
    pub fn has_recipient(&self) -> bool {
        !self.recipient.is_blank()
    }

    pub fn is_notified(&self) -> bool {
        self.notified.is_truthy()
    }

    /// Pending rows get a notification: a recipient is present and the flag is unset.
    pub fn is_pending(&self) -> bool {
        self.has_recipient() && !self.is_notified()
    }
}

/// Rendered message ready for the messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_number_display_drops_integral_fraction() {
        assert_eq!(CellValue::Number(100.0).to_string(), "100");
        assert_eq!(CellValue::Number(99.5).to_string(), "99.5");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_cell_truthiness() {
        assert!(CellValue::Bool(true).is_truthy());
        assert!(!CellValue::Bool(false).is_truthy());
        assert!(!CellValue::Number(0.0).is_truthy());
        assert!(CellValue::text("TRUE").is_truthy());
        assert!(!CellValue::text("").is_truthy());
        assert!(!CellValue::Empty.is_truthy());
    }

    #[test]
    fn test_cell_value_json_untagged() {
        let cells: Vec<CellValue> = serde_json::from_str(r#"[true, 12.5, "x", null]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                CellValue::Bool(true),
                CellValue::Number(12.5),
                CellValue::text("x"),
                CellValue::Empty
            ]
        );
    }

    #[test]
    fn test_run_record_replaces_same_key() {
        let mut run = ProvisioningRun::start(ContainerId::new("c"));
        let mut entry = TemplateEntry::collection(
            TemplateKey::InvoiceDatabase,
            ArtifactId::new("t"),
            "Invoice Database",
        );
        run.record(entry.clone());
        entry.assigned_id = Some(ArtifactId::new("copy"));
        run.record(entry);
        assert_eq!(run.entries.len(), 1);
        assert!(run.entry(TemplateKey::InvoiceDatabase).unwrap().is_provisioned());
    }
}
