/*!
 * Mother/child relationship manager.
 *
 * This module handles:
 * - Recording which child regions a master spawned for its overflow
 * - Cascade deletion of a master's children through the editor
 * - Re-splitting a master's text and rebuilding its chain
 * - Export and import of the relationship maps
 *
 * State lives behind a `parking_lot::RwLock` that is never held across an
 * await. Operations on the same master are serialized by a per-master async
 * lock, so a cascade delete always completes before the rerender that
 * follows it starts.
 */

use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::errors::{RelationshipError, StateError};
use crate::layout::capacity::{Capacity, RegionConfig};
use crate::layout::engine::LayoutEngine;

use super::collaborator::{MotherCollaborator, NoopCollaborator};
use super::models::{
    child_region_id, family_root, same_family, MotherConfig, MotherRelationship, OverflowChainMetadata,
    RelationshipState,
};

/// Result of rebuilding a master's chain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOutcome {
    /// Master region
    pub master_id: String,
    /// Text placed in each region, master first
    pub text_distribution: Vec<String>,
    /// Children that were created, in order
    pub child_ids: Vec<String>,
    /// Whether the text needed more than the master
    pub has_overflow: bool,
    /// Chunks whose child region could not be created
    pub unplaced_chunks: usize,
}

impl ChainOutcome {
    fn single(master_id: &str, text: String) -> Self {
        Self {
            master_id: master_id.to_string(),
            text_distribution: vec![text],
            child_ids: Vec::new(),
            has_overflow: false,
            unplaced_chunks: 0,
        }
    }
}

/// Tracks overflow chains and drives the editor through a collaborator
pub struct RelationshipManager {
    /// Editor callbacks
    collaborator: Arc<dyn MotherCollaborator>,
    /// Wrapping and splitting
    engine: LayoutEngine,
    /// Relationship and chain metadata maps
    state: RwLock<RelationshipState>,
    /// One async lock per master id
    chain_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RelationshipManager {
    /// Create a manager with the default layout engine
    pub fn new(collaborator: Arc<dyn MotherCollaborator>) -> Self {
        Self::with_engine(collaborator, LayoutEngine::default())
    }

    /// Create a manager with a specific layout engine
    pub fn with_engine(collaborator: Arc<dyn MotherCollaborator>, engine: LayoutEngine) -> Self {
        Self {
            collaborator,
            engine,
            state: RwLock::new(RelationshipState::default()),
            chain_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a manager whose callbacks do nothing
    pub fn without_callbacks() -> Self {
        Self::new(Arc::new(NoopCollaborator))
    }

    /// Get the layout engine
    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    // =========================================================================
    // Relationship records
    // =========================================================================

    /// Record that `master_id` owns `child_ids`
    ///
    /// Rejects empty chains, self references, children outside the master's
    /// family, distributions that do not cover every region and masters that
    /// already own a chain. Nothing is stored when the call is rejected.
    pub fn establish_relationship(
        &self,
        master_id: &str,
        child_ids: Vec<String>,
        content_type: &str,
        original_text: &str,
        text_distribution: Vec<String>,
    ) -> Result<(), RelationshipError> {
        self.insert_relationship(master_id, child_ids, content_type, original_text, text_distribution, Vec::new())
    }

    fn insert_relationship(
        &self,
        master_id: &str,
        child_ids: Vec<String>,
        content_type: &str,
        original_text: &str,
        text_distribution: Vec<String>,
        capacity_limits: Vec<usize>,
    ) -> Result<(), RelationshipError> {
        if let Err(e) = validate_chain(master_id, &child_ids, text_distribution.len()) {
            warn!("Rejected relationship for {}: {}", master_id, e);
            return Err(e);
        }

        let mut state = self.state.write();
        if state.relationships.contains_key(master_id) {
            let e = RelationshipError::AlreadyRelated {
                master_id: master_id.to_string(),
            };
            warn!("Rejected relationship for {}: {}", master_id, e);
            return Err(e);
        }

        info!(
            "Established relationship {} -> [{}]",
            master_id,
            child_ids.join(", ")
        );

        state.chain_metadata.insert(
            master_id.to_string(),
            OverflowChainMetadata::new(original_text, text_distribution, capacity_limits),
        );
        state.relationships.insert(
            master_id.to_string(),
            MotherRelationship::new(master_id, child_ids, content_type),
        );
        Ok(())
    }

    /// Get the relationship of a master
    pub fn get_relationship(&self, master_id: &str) -> Option<MotherRelationship> {
        self.state.read().relationships.get(master_id).cloned()
    }

    /// Whether a master currently owns a chain
    pub fn has_relationship(&self, master_id: &str) -> bool {
        self.state.read().relationships.contains_key(master_id)
    }

    /// Snapshot of every relationship, keyed by master id
    pub fn get_all_relationships(&self) -> BTreeMap<String, MotherRelationship> {
        self.state.read().relationships.clone()
    }

    /// Get the chain metadata of a master
    pub fn get_chain_metadata(&self, master_id: &str) -> Option<OverflowChainMetadata> {
        self.state.read().chain_metadata.get(master_id).cloned()
    }

    /// Master owning a child region, if any
    pub fn master_of(&self, child_id: &str) -> Option<String> {
        self.state
            .read()
            .relationships
            .values()
            .find(|r| r.child_ids.iter().any(|c| c == child_id))
            .map(|r| r.master_id.clone())
    }

    /// Drop every record without notifying the editor
    pub fn clear_all_relationships(&self) {
        let mut state = self.state.write();
        let count = state.relationships.len();
        state.relationships.clear();
        state.chain_metadata.clear();
        drop(state);
        self.prune_chain_locks();
        debug!("Cleared {} relationship(s)", count);
    }

    // =========================================================================
    // Chain lifecycle
    // =========================================================================

    fn chain_lock(&self, master_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.chain_locks
            .lock()
            .entry(master_id.to_string())
            .or_default()
            .clone()
    }

    // Drop the master's lock entry once no other caller holds or waits on it.
    // Clones are only taken under the map mutex, so a count of two (map and
    // `lock`) cannot grow while we hold it.
    fn release_chain_lock(&self, master_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.chain_locks.lock();
        let idle = locks
            .get(master_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(master_id);
        }
    }

    fn prune_chain_locks(&self) {
        self.chain_locks.lock().retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Delete every child of a master and forget its chain
    ///
    /// Returns the number of children the editor deleted. A failing delete is
    /// logged and the cascade carries on with the next child.
    pub async fn cascade_delete_children(&self, master_id: &str) -> usize {
        let lock = self.chain_lock(master_id);
        let deleted = {
            let _guard = lock.lock().await;
            self.cascade_locked(master_id).await
        };
        self.release_chain_lock(master_id, lock);
        deleted
    }

    async fn cascade_locked(&self, master_id: &str) -> usize {
        let Some(relationship) = self.get_relationship(master_id) else {
            debug!("No children to delete for {}", master_id);
            return 0;
        };

        info!(
            "Cascade deleting {} child region(s) of {}",
            relationship.child_ids.len(),
            master_id
        );

        let mut deleted = 0;
        for child_id in &relationship.child_ids {
            match self.collaborator.on_mother_deleted(child_id).await {
                Ok(()) => deleted += 1,
                Err(e) => error!("Failed to delete child {} of {}: {}", child_id, master_id, e),
            }
        }

        let mut state = self.state.write();
        state.relationships.remove(master_id);
        state.chain_metadata.remove(master_id);
        deleted
    }

    /// Split `new_text` for a master without a chain and build the chain
    ///
    /// Children are created first, then every region receives its text. The
    /// master must not own a chain; use `handle_chain_management` to replace
    /// an existing one.
    pub async fn dynamic_rerender<F>(
        &self,
        master_id: &str,
        new_text: &str,
        config: &RegionConfig,
        capacity_fn: F,
    ) -> Result<ChainOutcome, RelationshipError>
    where
        F: Fn(&RegionConfig) -> Capacity + Send + Sync,
    {
        let lock = self.chain_lock(master_id);
        let result = {
            let _guard = lock.lock().await;
            if self.has_relationship(master_id) {
                Err(RelationshipError::AlreadyRelated {
                    master_id: master_id.to_string(),
                })
            } else {
                Ok(self.rerender_locked(master_id, new_text, config, capacity_fn(config)).await)
            }
        };
        self.release_chain_lock(master_id, lock);
        result
    }

    async fn rerender_locked(
        &self,
        master_id: &str,
        new_text: &str,
        config: &RegionConfig,
        capacity: Capacity,
    ) -> ChainOutcome {
        let analysis = self.engine.analyze_with_capacity(new_text, capacity);
        let mut chunks = analysis.chunks.into_iter();
        let master_text = chunks.next().unwrap_or_default();

        if !analysis.has_overflow || chunks.len() == 0 {
            debug!("{} fits in its region", master_id);
            return ChainOutcome::single(master_id, master_text);
        }

        let total_regions = chunks.len() + 1;
        let planned: Vec<String> = (1..total_regions).map(|i| child_region_id(master_id, i)).collect();
        if let Err(e) = validate_chain(master_id, &planned, total_regions) {
            error!("Cannot build a chain for {}: {}", master_id, e);
            return ChainOutcome {
                unplaced_chunks: planned.len(),
                has_overflow: true,
                ..ChainOutcome::single(master_id, master_text)
            };
        }

        info!(
            "{} overflows: {} lines over {} region(s)",
            master_id,
            analysis.lines.len(),
            total_regions
        );

        let mut created: Vec<(String, String)> = Vec::with_capacity(total_regions - 1);
        let mut unplaced_chunks = 0;
        for (offset, chunk) in chunks.enumerate() {
            let child_index = offset + 1;
            let child_config = MotherConfig::for_child(master_id, config, child_index, total_regions);
            match self.collaborator.on_mother_created(&child_config.id, &child_config).await {
                Ok(()) => created.push((child_config.id, chunk)),
                Err(e) => {
                    error!(
                        "Failed to create {}, dropping {} chars: {}",
                        child_region_id(master_id, child_index),
                        chunk.chars().count(),
                        e
                    );
                    unplaced_chunks += 1;
                }
            }
        }

        self.push_content(master_id, &master_text).await;
        for (child_id, chunk) in &created {
            self.push_content(child_id, chunk).await;
        }

        let (mut child_ids, child_texts): (Vec<String>, Vec<String>) = created.into_iter().unzip();
        let mut text_distribution = Vec::with_capacity(child_texts.len() + 1);
        text_distribution.push(master_text);
        text_distribution.extend(child_texts);

        if !child_ids.is_empty() {
            let capacity_limits = vec![capacity.max_lines; child_ids.len() + 1];
            if let Err(e) = self.insert_relationship(
                master_id,
                child_ids.clone(),
                &config.content_type,
                new_text,
                text_distribution.clone(),
                capacity_limits,
            ) {
                // Unrecorded children cannot be cascaded later
                error!("Children of {} could not be recorded, deleting them: {}", master_id, e);
                for child_id in &child_ids {
                    if let Err(e) = self.collaborator.on_mother_deleted(child_id).await {
                        error!("Failed to delete unrecorded child {}: {}", child_id, e);
                    }
                }
                unplaced_chunks += child_ids.len();
                child_ids.clear();
                text_distribution.truncate(1);
            }
        }

        ChainOutcome {
            master_id: master_id.to_string(),
            text_distribution,
            child_ids,
            has_overflow: true,
            unplaced_chunks,
        }
    }

    async fn push_content(&self, region_id: &str, text: &str) {
        if let Err(e) = self.collaborator.on_content_updated(region_id, text).await {
            error!("Failed to update content of {}: {}", region_id, e);
        }
    }

    /// Replace a master's chain: cascade delete, then rerender
    pub async fn handle_chain_management<F>(
        &self,
        master_id: &str,
        new_text: &str,
        config: &RegionConfig,
        capacity_fn: F,
    ) -> ChainOutcome
    where
        F: Fn(&RegionConfig) -> Capacity + Send + Sync,
    {
        let lock = self.chain_lock(master_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.cascade_locked(master_id).await;
            self.rerender_locked(master_id, new_text, config, capacity_fn(config)).await
        };
        self.release_chain_lock(master_id, lock);
        outcome
    }

    /// Whether an edit invalidates the chain of a master
    ///
    /// True only when the master owns a chain and the text actually changed.
    pub fn detect_overflow_change(&self, master_id: &str, old_text: &str, new_text: &str) -> bool {
        old_text != new_text && self.has_relationship(master_id)
    }

    /// React to an edit of a master's text
    ///
    /// A master with a chain always gets its chain rebuilt. A master without
    /// one only gets a chain when the new text overflows. Returns `None` when
    /// nothing had to change.
    pub async fn handle_content_change<F>(
        &self,
        master_id: &str,
        old_text: &str,
        new_text: &str,
        config: &RegionConfig,
        capacity_fn: F,
    ) -> Option<ChainOutcome>
    where
        F: Fn(&RegionConfig) -> Capacity + Send + Sync,
    {
        if old_text == new_text {
            return None;
        }

        let capacity = capacity_fn(config);
        if !self.detect_overflow_change(master_id, old_text, new_text) {
            let overflows = self.engine.wrap(new_text, &capacity).len() > capacity.max_lines;
            if !overflows {
                debug!("{} changed without overflow", master_id);
                return None;
            }
        }

        Some(self.handle_chain_management(master_id, new_text, config, move |_| capacity).await)
    }

    /// Cascade delete every chain, then clear all records
    pub async fn teardown(&self) {
        let masters: Vec<String> = self.state.read().relationships.keys().cloned().collect();
        for master_id in masters {
            self.cascade_delete_children(&master_id).await;
        }
        self.clear_all_relationships();
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Snapshot of both maps
    pub fn export_state(&self) -> RelationshipState {
        self.state.read().clone()
    }

    /// Replace both maps with a snapshot
    ///
    /// Relationships that break the chain rules and metadata without a
    /// relationship are dropped. Returns the number of relationships kept.
    pub fn import_state(&self, snapshot: RelationshipState) -> usize {
        let RelationshipState {
            mut relationships,
            mut chain_metadata,
        } = snapshot;

        relationships.retain(|key, relationship| {
            if key != &relationship.master_id {
                warn!("Skipping imported relationship {}: keyed under another master", key);
                return false;
            }
            let expected = chain_metadata
                .get(key)
                .map_or(relationship.chain_len(), |m| m.text_distribution.len());
            match validate_chain(key, &relationship.child_ids, expected) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping imported relationship {}: {}", key, e);
                    false
                }
            }
        });
        chain_metadata.retain(|key, _| relationships.contains_key(key));

        let count = relationships.len();
        *self.state.write() = RelationshipState {
            relationships,
            chain_metadata,
        };
        info!("Imported {} relationship(s)", count);
        count
    }

    /// Export the state as JSON
    pub fn export_json(&self) -> Result<String, StateError> {
        self.export_state().to_json()
    }

    /// Import state from JSON
    pub fn import_json(&self, json: &str) -> Result<usize, StateError> {
        let snapshot = RelationshipState::from_json(json)?;
        Ok(self.import_state(snapshot))
    }
}

fn validate_chain(master_id: &str, child_ids: &[String], distribution_len: usize) -> Result<(), RelationshipError> {
    if child_ids.is_empty() {
        return Err(RelationshipError::EmptyChain {
            master_id: master_id.to_string(),
        });
    }

    for child_id in child_ids {
        if child_id == master_id {
            return Err(RelationshipError::SelfReference {
                master_id: master_id.to_string(),
            });
        }
        if !same_family(master_id, child_id) {
            return Err(RelationshipError::CrossFamily {
                master_id: master_id.to_string(),
                child_id: child_id.clone(),
                master_family: family_root(master_id),
                child_family: family_root(child_id),
            });
        }
    }

    let expected = child_ids.len() + 1;
    if distribution_len != expected {
        return Err(RelationshipError::DistributionMismatch {
            master_id: master_id.to_string(),
            expected,
            actual: distribution_len,
        });
    }
    Ok(())
}
