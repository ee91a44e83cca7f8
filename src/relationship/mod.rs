/*!
 * Mother/child overflow chains.
 *
 * - `models`: Relationship records, child naming, families and placement hints
 * - `collaborator`: Editor callbacks for creating, deleting and filling regions
 * - `manager`: The async manager that keeps chains consistent
 */

pub use self::collaborator::{LoggingCollaborator, MotherCollaborator, NoopCollaborator};
pub use self::manager::{ChainOutcome, RelationshipManager};
pub use self::models::{
    calculate_split_points, child_region_id, determine_placement, family_root, is_suffixed_child,
    letter_suffix, same_family, LayoutHint, MotherConfig, MotherRelationship, MultiRegionPlacement,
    OverflowChainMetadata, PlacementPriority, RegionPlacement, RegionTarget, RelationshipState,
};

pub mod collaborator;
pub mod manager;
pub mod models;
