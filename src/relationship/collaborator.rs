/*!
 * Editor callbacks used by the relationship manager.
 *
 * The manager never touches the canvas itself. Creating a child region,
 * deleting one and pushing text into a region all go through a
 * `MotherCollaborator`, so a failing editor call surfaces as a
 * `CollaboratorError` that the manager can log and step over.
 */

use async_trait::async_trait;
use log::info;

use crate::errors::CollaboratorError;

use super::models::MotherConfig;

/// Callbacks into the editor that owns the regions
#[async_trait]
pub trait MotherCollaborator: Send + Sync {
    /// Create a child region
    ///
    /// # Arguments
    /// * `child_id` - Id of the region to create
    /// * `config` - Geometry, typography and placement hint for the region
    async fn on_mother_created(&self, child_id: &str, config: &MotherConfig) -> Result<(), CollaboratorError>;

    /// Delete a child region
    async fn on_mother_deleted(&self, child_id: &str) -> Result<(), CollaboratorError>;

    /// Replace the text shown in a region
    async fn on_content_updated(&self, region_id: &str, text: &str) -> Result<(), CollaboratorError>;
}

/// Accepts every call and does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCollaborator;

#[async_trait]
impl MotherCollaborator for NoopCollaborator {
    async fn on_mother_created(&self, _child_id: &str, _config: &MotherConfig) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn on_mother_deleted(&self, _child_id: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn on_content_updated(&self, _region_id: &str, _text: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Logs every call, used by the CLI dry run
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCollaborator;

#[async_trait]
impl MotherCollaborator for LoggingCollaborator {
    async fn on_mother_created(&self, child_id: &str, config: &MotherConfig) -> Result<(), CollaboratorError> {
        match &config.placement {
            Some(hint) => info!(
                "Create region {} (child {} of {}, {:?}/{:?})",
                child_id,
                hint.child_index,
                hint.total_regions,
                hint.placement.target_region,
                hint.placement.layout_hint
            ),
            None => info!("Create region {} from {}", child_id, config.master_id),
        }
        Ok(())
    }

    async fn on_mother_deleted(&self, child_id: &str) -> Result<(), CollaboratorError> {
        info!("Delete region {}", child_id);
        Ok(())
    }

    async fn on_content_updated(&self, region_id: &str, text: &str) -> Result<(), CollaboratorError> {
        info!("Update region {} ({} chars)", region_id, text.chars().count());
        Ok(())
    }
}
