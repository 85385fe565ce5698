//! Keeps every produced artifact in exactly one destination container.
//!
//! The store's copy primitive can't always place a copy atomically (bound form copies
//! land in the root), so placement is fixed up after the fact: add, then prune.

use crate::domain::{ArtifactId, ContainerId, DomainError};
use crate::ports::ArtifactStore;
use std::sync::Arc;
use tracing::debug;

/// Workspace organizer. Reparents artifacts into a single container.
pub struct WorkspaceOrganizer {
    store: Arc<dyn ArtifactStore>,
}

impl WorkspaceOrganizer {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// Move `artifact` into `container` and out of every other container.
    /// Afterwards its only parent is `container`, however many it had before.
    pub async fn relocate(
        &self,
        artifact: &ArtifactId,
        container: &ContainerId,
    ) -> Result<(), DomainError> {
        self.store.add_to_container(artifact, container).await?;

        let parents = self.store.parents(artifact).await?;
        let mut removed = 0usize;
        for parent in parents.iter().filter(|p| *p != container) {
            self.store.remove_from_container(artifact, parent).await?;
            removed += 1;
        }
        debug!(
            artifact = %artifact,
            container = %container,
            removed,
            "relocated artifact"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::local_drive::{LocalDrive, ROOT_CONTAINER};

    async fn setup() -> (Arc<LocalDrive>, WorkspaceOrganizer, ArtifactId, ContainerId) {
        let drive = Arc::new(LocalDrive::in_memory());
        let doc = drive.insert_spreadsheet("Doc", vec![]).await.unwrap();
        let target = drive.create_container("Target").await.unwrap();
        let organizer = WorkspaceOrganizer::new(Arc::clone(&drive) as Arc<dyn ArtifactStore>);
        (drive, organizer, doc, target)
    }

    #[tokio::test]
    async fn test_relocate_from_no_container() {
        let (drive, organizer, doc, target) = setup().await;
        drive
            .remove_from_container(&doc, &ContainerId::new(ROOT_CONTAINER))
            .await
            .unwrap();
        assert!(drive.parents(&doc).await.unwrap().is_empty());

        organizer.relocate(&doc, &target).await.unwrap();
        assert_eq!(drive.parents(&doc).await.unwrap(), vec![target]);
    }

    #[tokio::test]
    async fn test_relocate_from_one_container() {
        let (drive, organizer, doc, target) = setup().await;
        organizer.relocate(&doc, &target).await.unwrap();
        assert_eq!(drive.parents(&doc).await.unwrap(), vec![target]);
    }

    #[tokio::test]
    async fn test_relocate_from_two_containers() {
        let (drive, organizer, doc, target) = setup().await;
        let other = drive.create_container("Other").await.unwrap();
        drive.add_to_container(&doc, &other).await.unwrap();
        assert_eq!(drive.parents(&doc).await.unwrap().len(), 2);

        organizer.relocate(&doc, &target).await.unwrap();
        assert_eq!(drive.parents(&doc).await.unwrap(), vec![target.clone()]);
        assert!(drive.children(&other).await.is_empty());
    }

    #[tokio::test]
    async fn test_relocate_into_current_container_is_noop() {
        let (drive, organizer, doc, target) = setup().await;
        organizer.relocate(&doc, &target).await.unwrap();
        organizer.relocate(&doc, &target).await.unwrap();
        assert_eq!(drive.parents(&doc).await.unwrap(), vec![target]);
    }

    #[tokio::test]
    async fn test_relocate_into_unknown_container_fails() {
        let (_drive, organizer, doc, _target) = setup().await;
        let err = organizer
            .relocate(&doc, &ContainerId::new("nowhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
