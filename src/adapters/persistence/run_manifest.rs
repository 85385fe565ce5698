//! Implements RunManifestPort using a JSON file.
//!
//! Holds the last provisioning run so later invocations find the dashboard and know
//! setup already happened.

use super::write_atomic;
use crate::domain::{DomainError, ProvisioningRun};
use crate::ports::RunManifestPort;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// JSON file-based run manifest.
pub struct RunManifestJson {
    path: PathBuf,
}

impl RunManifestJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl RunManifestPort for RunManifestJson {
    async fn load(&self) -> Result<Option<ProvisioningRun>, DomainError> {
        let s = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DomainError::Manifest(e.to_string())),
        };
        let run = serde_json::from_str(&s).map_err(|e| {
            DomainError::Manifest(format!("parse {}: {}", self.path.display(), e))
        })?;
        Ok(Some(run))
    }

    async fn save(&self, run: &ProvisioningRun) -> Result<(), DomainError> {
        let json =
            serde_json::to_string_pretty(run).map_err(|e| DomainError::Manifest(e.to_string()))?;
        write_atomic(&self.path, json.as_bytes()).await?;
        info!(path = %self.path.display(), "saved provisioning run manifest");
        Ok(())
    }
}
