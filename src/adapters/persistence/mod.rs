//! Persistence adapters: file-backed drive and run manifest.

pub mod local_drive;
pub mod run_manifest;

use crate::domain::DomainError;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Write-replace: temp file, `sync_all`, then rename over `path`.
/// A crash mid-write leaves the previous file intact.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Store(format!("create dir: {}", e)))?;
        }
    }
    let temp_path = path.with_extension("json.tmp");
    let mut f = fs::File::create(&temp_path)
        .await
        .map_err(|e| DomainError::Store(format!("create temp file: {}", e)))?;
    f.write_all(bytes)
        .await
        .map_err(|e| DomainError::Store(format!("write temp file: {}", e)))?;
    f.sync_all()
        .await
        .map_err(|e| DomainError::Store(format!("sync temp file: {}", e)))?;
    drop(f);

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| DomainError::Store(format!("atomic rename failed: {}", e)))?;
    Ok(())
}
