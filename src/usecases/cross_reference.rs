//! Writes generated form ids into the configuration area of a sibling document.

use crate::domain::{ArtifactId, CellAddress, CellValue, DomainError};
use crate::ports::SheetStore;
use std::sync::Arc;
use tracing::info;

/// One cross-link: the identifier stored at a fixed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossLink {
    pub address: CellAddress,
    pub id: ArtifactId,
}

impl CrossLink {
    pub fn new(address: CellAddress, id: ArtifactId) -> Self {
        Self { address, id }
    }
}

/// Cross-reference writer.
pub struct CrossReferenceWriter {
    sheets: Arc<dyn SheetStore>,
}

impl CrossReferenceWriter {
    pub fn new(sheets: Arc<dyn SheetStore>) -> Self {
        Self { sheets }
    }

    /// Write every link into `sheet` of `target`.
    ///
    /// A missing document or sheet fails with `TargetMissing` before anything is written;
    /// after that the batch is fail-fast (the first failed write aborts the rest).
    pub async fn write_links(
        &self,
        target: &ArtifactId,
        sheet: &str,
        links: &[CrossLink],
    ) -> Result<(), DomainError> {
        let present = self
            .sheets
            .has_sheet(target, sheet)
            .await
            .map_err(|e| match e {
                DomainError::NotFound(what) => DomainError::TargetMissing(what),
                other => other,
            })?;
        if !present {
            return Err(DomainError::TargetMissing(format!(
                "sheet '{}' in {}",
                sheet, target
            )));
        }

        for link in links {
            self.sheets
                .write_cell(
                    target,
                    sheet,
                    link.address,
                    CellValue::text(link.id.as_str()),
                )
                .await?;
        }
        info!(target = %target, sheet, count = links.len(), "wrote cross-references");
        Ok(())
    }
}
