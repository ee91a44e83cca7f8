/*!
 * Error types for the labelflow library.
 *
 * This module contains custom error types for the different parts of the
 * overflow engine, using the thiserror crate for ergonomic error definitions.
 * The pure capacity, wrapping and segmentation functions never fail; only the
 * relationship manager and the application glue surface these types.
 */

use thiserror::Error;

/// Errors reported by a collaborator callback (region creation, deletion or update)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// The editor could not create a child region
    #[error("Failed to create region {region_id}: {message}")]
    CreateFailed {
        /// Region that was being created
        region_id: String,
        /// Message from the collaborator
        message: String,
    },

    /// The editor could not delete a child region
    #[error("Failed to delete region {region_id}: {message}")]
    DeleteFailed {
        /// Region that was being deleted
        region_id: String,
        /// Message from the collaborator
        message: String,
    },

    /// The editor could not push text into a region
    #[error("Failed to update content of region {region_id}: {message}")]
    UpdateFailed {
        /// Region whose content was being replaced
        region_id: String,
        /// Message from the collaborator
        message: String,
    },
}

/// Policy violations and state conflicts in the mother/child relationship map
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelationshipError {
    /// A child id does not share the family root of its master
    #[error("Cross-family link rejected: {child_id} (family {child_family}) cannot belong to {master_id} (family {master_family})")]
    CrossFamily {
        master_id: String,
        child_id: String,
        master_family: String,
        child_family: String,
    },

    /// A master listed itself as one of its children
    #[error("Region {master_id} cannot be its own child")]
    SelfReference { master_id: String },

    /// A relationship without children was requested
    #[error("Relationship for {master_id} has no children")]
    EmptyChain { master_id: String },

    /// The text distribution does not cover the master plus every child
    #[error("Text distribution for {master_id} has {actual} entries, expected {expected}")]
    DistributionMismatch {
        master_id: String,
        expected: usize,
        actual: usize,
    },

    /// The master still owns a chain that has not been cascade-deleted
    #[error("Region {master_id} already has an active overflow chain")]
    AlreadyRelated { master_id: String },
}

/// Errors raised while exporting or importing manager state
#[derive(Error, Debug)]
pub enum StateError {
    /// State could not be serialized
    #[error("Failed to serialize relationship state: {0}")]
    Serialize(String),

    /// State could not be parsed
    #[error("Failed to deserialize relationship state: {0}")]
    Deserialize(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a collaborator callback
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Error from the relationship manager
    #[error("Relationship error: {0}")]
    Relationship(#[from] RelationshipError),

    /// Error from state export or import
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::State(StateError::Deserialize(error.to_string()))
    }
}
