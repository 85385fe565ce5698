//! Implements ArtifactStore and SheetStore on a single JSON file.
//!
//! Mirrors the office suite's drive semantics closely enough to exercise the workflow:
//! copying a spreadsheet with a bound form also copies the form, but the form copy lands
//! in the root container under a "Copy of ..." name.

use super::write_atomic;
use crate::domain::{ArtifactId, CellAddress, CellValue, ContainerId, DomainError, Grid};
use crate::ports::{ArtifactStore, SheetStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Id of the implicit top-level container. Copies the caller can't place land here.
pub const ROOT_CONTAINER: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Spreadsheet,
    Form,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContainerRecord {
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactRecord {
    name: String,
    kind: ArtifactKind,
    #[serde(default)]
    parents: BTreeSet<ContainerId>,
    #[serde(default)]
    sheets: BTreeMap<String, Grid>,
    /// Spreadsheet -> form that writes its responses into it.
    #[serde(default)]
    bound_form: Option<ArtifactId>,
}

/// Drive contents: containers and artifacts by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DriveData {
    #[serde(default)]
    containers: BTreeMap<ContainerId, ContainerRecord>,
    #[serde(default)]
    artifacts: BTreeMap<ArtifactId, ArtifactRecord>,
}

impl DriveData {
    fn ensure_root(&mut self) {
        self.containers
            .entry(ContainerId::new(ROOT_CONTAINER))
            .or_insert_with(|| ContainerRecord {
                name: "My Drive".to_string(),
            });
    }

    fn artifact(&self, id: &ArtifactId) -> Result<&ArtifactRecord, DomainError> {
        self.artifacts
            .get(id)
            .ok_or_else(|| DomainError::NotFound(format!("artifact {}", id)))
    }

    fn artifact_mut(&mut self, id: &ArtifactId) -> Result<&mut ArtifactRecord, DomainError> {
        self.artifacts
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("artifact {}", id)))
    }

    fn require_container(&self, id: &ContainerId) -> Result<(), DomainError> {
        if self.containers.contains_key(id) {
            Ok(())
        } else {
            Err(DomainError::NotFound(format!("container {}", id)))
        }
    }

    fn sheet(&self, id: &ArtifactId, sheet: &str) -> Result<&Grid, DomainError> {
        self.artifact(id)?
            .sheets
            .get(sheet)
            .ok_or_else(|| DomainError::TargetMissing(format!("sheet '{}' in {}", sheet, id)))
    }

    fn sheet_mut(&mut self, id: &ArtifactId, sheet: &str) -> Result<&mut Grid, DomainError> {
        self.artifact_mut(id)?
            .sheets
            .get_mut(sheet)
            .ok_or_else(|| DomainError::TargetMissing(format!("sheet '{}' in {}", sheet, id)))
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Ids of the templates created by [`LocalDrive::seed_templates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededTemplates {
    pub invoice_database: ArtifactId,
    pub supplier_database: ArtifactId,
    pub dashboard: ArtifactId,
}

/// JSON file-backed drive. `in_memory` drives never touch the disk.
pub struct LocalDrive {
    path: Option<PathBuf>,
    cache: tokio::sync::RwLock<DriveData>,
}

impl LocalDrive {
    pub fn in_memory() -> Self {
        let mut data = DriveData::default();
        data.ensure_root();
        Self {
            path: None,
            cache: tokio::sync::RwLock::new(data),
        }
    }

    /// Open the drive file at `path`. A missing file starts an empty drive.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();
        let mut data: DriveData = match fs::read_to_string(&path).await {
            Ok(s) => serde_json::from_str(&s)
                .map_err(|e| DomainError::Store(format!("parse {}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => DriveData::default(),
            Err(e) => return Err(DomainError::Store(format!("read {}: {}", path.display(), e))),
        };
        data.ensure_root();
        Ok(Self {
            path: Some(path),
            cache: tokio::sync::RwLock::new(data),
        })
    }

    async fn persist(&self, data: &DriveData) -> Result<(), DomainError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json =
            serde_json::to_string_pretty(data).map_err(|e| DomainError::Store(e.to_string()))?;
        write_atomic(path, json.as_bytes()).await
    }

    /// Apply `f` to a staged copy; the cache only changes once the file is written.
    async fn mutate<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        T: Send,
        F: FnOnce(&mut DriveData) -> Result<T, DomainError> + Send,
    {
        let mut data = self.cache.write().await;
        let mut staged = data.clone();
        let out = f(&mut staged)?;
        self.persist(&staged).await?;
        *data = staged;
        Ok(out)
    }

    /// Add a spreadsheet with the given sheets to the root container.
    pub async fn insert_spreadsheet(
        &self,
        name: &str,
        sheets: Vec<(String, Grid)>,
    ) -> Result<ArtifactId, DomainError> {
        let name = name.to_string();
        self.mutate(move |data| {
            let id = ArtifactId::new(new_id());
            data.artifacts.insert(
                id.clone(),
                ArtifactRecord {
                    name,
                    kind: ArtifactKind::Spreadsheet,
                    parents: BTreeSet::from([ContainerId::new(ROOT_CONTAINER)]),
                    sheets: sheets.into_iter().collect(),
                    bound_form: None,
                },
            );
            Ok(id)
        })
        .await
    }

    /// Add a form bound to `document_id`, in the root container.
    pub async fn insert_bound_form(
        &self,
        document_id: &ArtifactId,
        name: &str,
    ) -> Result<ArtifactId, DomainError> {
        let document_id = document_id.clone();
        let name = name.to_string();
        self.mutate(move |data| {
            let form_id = ArtifactId::new(new_id());
            data.artifact_mut(&document_id)?.bound_form = Some(form_id.clone());
            data.artifacts.insert(
                form_id.clone(),
                ArtifactRecord {
                    name,
                    kind: ArtifactKind::Form,
                    parents: BTreeSet::from([ContainerId::new(ROOT_CONTAINER)]),
                    sheets: BTreeMap::new(),
                    bound_form: None,
                },
            );
            Ok(form_id)
        })
        .await
    }

    /// Drop the link between a document and its form (the form itself stays).
    pub async fn unbind_form(&self, document_id: &ArtifactId) -> Result<(), DomainError> {
        let document_id = document_id.clone();
        self.mutate(move |data| {
            data.artifact_mut(&document_id)?.bound_form = None;
            Ok(())
        })
        .await
    }

    pub async fn artifact_name(&self, id: &ArtifactId) -> Result<String, DomainError> {
        let data = self.cache.read().await;
        Ok(data.artifact(id)?.name.clone())
    }

    pub async fn artifact_kind(&self, id: &ArtifactId) -> Result<ArtifactKind, DomainError> {
        let data = self.cache.read().await;
        Ok(data.artifact(id)?.kind)
    }

    pub async fn container_name(&self, id: &ContainerId) -> Result<String, DomainError> {
        let data = self.cache.read().await;
        data.containers
            .get(id)
            .map(|c| c.name.clone())
            .ok_or_else(|| DomainError::NotFound(format!("container {}", id)))
    }

    /// Ids of artifacts directly inside `container`.
    pub async fn children(&self, container: &ContainerId) -> Vec<ArtifactId> {
        let data = self.cache.read().await;
        data.artifacts
            .iter()
            .filter(|(_, a)| a.parents.contains(container))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Create demo templates (invoice and supplier databases with bound forms) and a
    /// dashboard holding the payment log and email template.
    pub async fn seed_templates(&self) -> Result<SeededTemplates, DomainError> {
        let invoice_database = self
            .insert_spreadsheet(
                "Invoice Database Template",
                vec![(
                    "Form Responses 1".to_string(),
                    vec![vec![
                        "Timestamp".into(),
                        "Supplier".into(),
                        "Invoice number".into(),
                        "Amount".into(),
                        "Currency".into(),
                        "Due date".into(),
                    ]],
                )],
            )
            .await?;
        self.insert_bound_form(&invoice_database, "Invoices Registration Form Template")
            .await?;

        let supplier_database = self
            .insert_spreadsheet(
                "Supplier Database Template",
                vec![
                    (
                        "Form Responses 1".to_string(),
                        vec![vec![
                            "Timestamp".into(),
                            "Supplier".into(),
                            "Email".into(),
                            "Contact name".into(),
                        ]],
                    ),
                    (
                        "Settings".to_string(),
                        vec![
                            vec!["Invoice form id".into(), CellValue::Empty],
                            vec!["Supplier form id".into(), CellValue::Empty],
                        ],
                    ),
                ],
            )
            .await?;
        self.insert_bound_form(&supplier_database, "Supplier Registration Form Template")
            .await?;

        let header: Vec<CellValue> = [
            "Email",
            "Name",
            "Invoice number",
            "Amount",
            "Currency",
            "Issue date",
            "Due date",
            "Paid date",
            "Payment method",
            "Reference",
            "Status",
            "Notes",
            "Email sent",
        ]
        .into_iter()
        .map(CellValue::from)
        .collect();
        let mut email_data: Grid = vec![Vec::new(); 5];
        email_data[3] = vec![
            CellValue::Empty,
            "Subject".into(),
            "Payment confirmation".into(),
        ];
        email_data[4] = vec![
            CellValue::Empty,
            "Body".into(),
            "<p>Dear %name%,</p><p>your invoice of %amount% %currency% has been paid.</p>"
                .into(),
        ];
        let dashboard = self
            .insert_spreadsheet(
                "Untitled spreadsheet",
                vec![
                    ("Invoices paid".to_string(), vec![header]),
                    ("Email data".to_string(), email_data),
                ],
            )
            .await?;

        Ok(SeededTemplates {
            invoice_database,
            supplier_database,
            dashboard,
        })
    }
}

#[async_trait::async_trait]
impl ArtifactStore for LocalDrive {
    async fn create_container(&self, name: &str) -> Result<ContainerId, DomainError> {
        let name = name.to_string();
        self.mutate(move |data| {
            let id = ContainerId::new(new_id());
            data.containers.insert(id.clone(), ContainerRecord { name });
            Ok(id)
        })
        .await
    }

    async fn duplicate(
        &self,
        template_id: &ArtifactId,
        new_name: &str,
        destination: &ContainerId,
    ) -> Result<ArtifactId, DomainError> {
        let template_id = template_id.clone();
        let destination = destination.clone();
        let new_name = new_name.to_string();
        let copy_id = self
            .mutate(move |data| {
                let template = data.artifact(&template_id)?.clone();
                data.require_container(&destination)?;

                let bound_form = match &template.bound_form {
                    Some(form_id) => {
                        let form = data.artifact(form_id)?.clone();
                        let form_copy = ArtifactId::new(new_id());
                        data.artifacts.insert(
                            form_copy.clone(),
                            ArtifactRecord {
                                name: format!("Copy of {}", form.name),
                                kind: form.kind,
                                parents: BTreeSet::from([ContainerId::new(ROOT_CONTAINER)]),
                                sheets: BTreeMap::new(),
                                bound_form: None,
                            },
                        );
                        Some(form_copy)
                    }
                    None => None,
                };

                let copy_id = ArtifactId::new(new_id());
                data.artifacts.insert(
                    copy_id.clone(),
                    ArtifactRecord {
                        name: new_name,
                        kind: template.kind,
                        parents: BTreeSet::from([destination]),
                        sheets: template.sheets,
                        bound_form,
                    },
                );
                Ok(copy_id)
            })
            .await?;
        debug!(copy_id = %copy_id, "duplicated artifact");
        Ok(copy_id)
    }

    async fn resolve_companion_form(
        &self,
        document_id: &ArtifactId,
    ) -> Result<Option<ArtifactId>, DomainError> {
        let data = self.cache.read().await;
        Ok(data.artifact(document_id)?.bound_form.clone())
    }

    async fn rename(&self, artifact_id: &ArtifactId, name: &str) -> Result<(), DomainError> {
        let artifact_id = artifact_id.clone();
        let name = name.to_string();
        self.mutate(move |data| {
            data.artifact_mut(&artifact_id)?.name = name;
            Ok(())
        })
        .await
    }

    async fn add_to_container(
        &self,
        artifact_id: &ArtifactId,
        container: &ContainerId,
    ) -> Result<(), DomainError> {
        let artifact_id = artifact_id.clone();
        let container = container.clone();
        self.mutate(move |data| {
            data.require_container(&container)?;
            data.artifact_mut(&artifact_id)?.parents.insert(container);
            Ok(())
        })
        .await
    }

    async fn remove_from_container(
        &self,
        artifact_id: &ArtifactId,
        container: &ContainerId,
    ) -> Result<(), DomainError> {
        let artifact_id = artifact_id.clone();
        let container = container.clone();
        self.mutate(move |data| {
            data.artifact_mut(&artifact_id)?.parents.remove(&container);
            Ok(())
        })
        .await
    }

    async fn parents(&self, artifact_id: &ArtifactId) -> Result<Vec<ContainerId>, DomainError> {
        let data = self.cache.read().await;
        Ok(data.artifact(artifact_id)?.parents.iter().cloned().collect())
    }
}

#[async_trait::async_trait]
impl SheetStore for LocalDrive {
    async fn has_sheet(&self, document_id: &ArtifactId, sheet: &str) -> Result<bool, DomainError> {
        let data = self.cache.read().await;
        Ok(data.artifact(document_id)?.sheets.contains_key(sheet))
    }

    async fn read_grid(&self, document_id: &ArtifactId, sheet: &str) -> Result<Grid, DomainError> {
        let data = self.cache.read().await;
        Ok(data.sheet(document_id, sheet)?.clone())
    }

    async fn read_cell(
        &self,
        document_id: &ArtifactId,
        sheet: &str,
        address: CellAddress,
    ) -> Result<CellValue, DomainError> {
        let data = self.cache.read().await;
        let grid = data.sheet(document_id, sheet)?;
        Ok(grid
            .get(address.row)
            .and_then(|row| row.get(address.col))
            .cloned()
            .unwrap_or_default())
    }

    async fn write_cell(
        &self,
        document_id: &ArtifactId,
        sheet: &str,
        address: CellAddress,
        value: CellValue,
    ) -> Result<(), DomainError> {
        let document_id = document_id.clone();
        let sheet = sheet.to_string();
        self.mutate(move |data| {
            let grid = data.sheet_mut(&document_id, &sheet)?;
            if grid.len() <= address.row {
                grid.resize(address.row + 1, Vec::new());
            }
            let row = &mut grid[address.row];
            if row.len() <= address.col {
                row.resize(address.col + 1, CellValue::Empty);
            }
            row[address.col] = value;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_places_form_copy_in_root() {
        let drive = LocalDrive::in_memory();
        let doc = drive
            .insert_spreadsheet("Template", vec![("Sheet1".to_string(), vec![])])
            .await
            .unwrap();
        drive.insert_bound_form(&doc, "Form").await.unwrap();
        let folder = drive.create_container("Dest").await.unwrap();

        let copy = drive.duplicate(&doc, "Copy", &folder).await.unwrap();
        assert_eq!(drive.parents(&copy).await.unwrap(), vec![folder]);

        let form = drive.resolve_companion_form(&copy).await.unwrap().unwrap();
        assert_eq!(drive.artifact_name(&form).await.unwrap(), "Copy of Form");
        assert_eq!(
            drive.parents(&form).await.unwrap(),
            vec![ContainerId::new(ROOT_CONTAINER)]
        );
        assert_eq!(drive.artifact_kind(&form).await.unwrap(), ArtifactKind::Form);
    }

    #[tokio::test]
    async fn test_duplicate_unknown_template_is_not_found() {
        let drive = LocalDrive::in_memory();
        let err = drive
            .duplicate(
                &ArtifactId::new("missing"),
                "x",
                &ContainerId::new(ROOT_CONTAINER),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_write_cell_grows_grid_and_missing_sheet_fails() {
        let drive = LocalDrive::in_memory();
        let doc = drive
            .insert_spreadsheet("Doc", vec![("Settings".to_string(), vec![])])
            .await
            .unwrap();
        let addr = CellAddress::new(1, 1);
        drive
            .write_cell(&doc, "Settings", addr, CellValue::text("id"))
            .await
            .unwrap();
        assert_eq!(
            drive.read_cell(&doc, "Settings", addr).await.unwrap(),
            CellValue::text("id")
        );
        assert_eq!(
            drive
                .read_cell(&doc, "Settings", CellAddress::new(7, 7))
                .await
                .unwrap(),
            CellValue::Empty
        );

        let err = drive
            .write_cell(&doc, "Nope", addr, CellValue::Empty)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::TargetMissing(_)));
    }

    #[tokio::test]
    async fn test_file_backed_drive_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drive.json");
        let seeded = {
            let drive = LocalDrive::open(&path).await.unwrap();
            drive.seed_templates().await.unwrap()
        };

        let reopened = LocalDrive::open(&path).await.unwrap();
        assert_eq!(
            reopened.artifact_name(&seeded.dashboard).await.unwrap(),
            "Untitled spreadsheet"
        );
        assert!(
            reopened
                .resolve_companion_form(&seeded.invoice_database)
                .await
                .unwrap()
                .is_some()
        );
        let subject = reopened
            .read_cell(&seeded.dashboard, "Email data", CellAddress::new(3, 2))
            .await
            .unwrap();
        assert_eq!(subject, CellValue::text("Payment confirmation"));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cache_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let drive = LocalDrive::open(data_dir.join("drive.json")).await.unwrap();
        let doc = drive
            .insert_spreadsheet("Log", vec![("Invoices paid".to_string(), vec![])])
            .await
            .unwrap();

        // A plain file where the data directory was makes every later save fail.
        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, b"").unwrap();

        let flag = CellAddress::new(1, 12);
        let err = drive
            .write_cell(&doc, "Invoices paid", flag, CellValue::Bool(true))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Store(_)));
        assert_eq!(
            drive.read_cell(&doc, "Invoices paid", flag).await.unwrap(),
            CellValue::Empty
        );

        assert!(drive.create_container("X").await.is_err());
    }
}
