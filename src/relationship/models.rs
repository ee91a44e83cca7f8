/*!
 * Data models for mother/child overflow chains.
 *
 * This module contains:
 * - The relationship and chain metadata records kept per master region
 * - The serializable state snapshot used for export and import
 * - Child id naming (letter suffixes) and family derivation
 * - Advisory placement hints for chains of three or more regions
 */

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::StateError;
use crate::layout::capacity::RegionConfig;

/// Splits an id into stem, numeric root and uppercase letter suffix
static FAMILY_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<stem>.*?)(?P<root>\d*)(?P<suffix>[A-Z]*)$").unwrap()
});

/// Master region and the child regions created for its overflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotherRelationship {
    /// Region whose text overflowed
    pub master_id: String,
    /// Child regions in overflow order
    pub child_ids: Vec<String>,
    /// Kind of content that overflowed
    pub content_type: String,
    /// When the relationship was established
    pub created_at: DateTime<Utc>,
    /// Last modification
    pub last_updated: DateTime<Utc>,
}

impl MotherRelationship {
    pub fn new(master_id: &str, child_ids: Vec<String>, content_type: &str) -> Self {
        let now = Utc::now();
        Self {
            master_id: master_id.to_string(),
            child_ids,
            content_type: content_type.to_string(),
            created_at: now,
            last_updated: now,
        }
    }

    /// Number of regions in the chain, master included
    pub fn chain_len(&self) -> usize {
        self.child_ids.len() + 1
    }

    /// Master first, then children
    pub fn chain(&self) -> Vec<&str> {
        std::iter::once(self.master_id.as_str())
            .chain(self.child_ids.iter().map(String::as_str))
            .collect()
    }
}

/// How the original text was spread over a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverflowChainMetadata {
    /// Text before splitting
    pub original_text: String,
    /// Cumulative character offsets at which chunks end (all but the last)
    pub split_points: Vec<usize>,
    /// Maximum lines of each region in the chain, empty when unknown
    #[serde(default)]
    pub capacity_limits: Vec<usize>,
    /// Text of each region, master first
    pub text_distribution: Vec<String>,
}

impl OverflowChainMetadata {
    pub fn new(original_text: &str, text_distribution: Vec<String>, capacity_limits: Vec<usize>) -> Self {
        Self {
            original_text: original_text.to_string(),
            split_points: calculate_split_points(&text_distribution),
            capacity_limits,
            text_distribution,
        }
    }

    /// Chunks rejoined on their boundaries
    pub fn reassembled(&self) -> String {
        self.text_distribution.join("\n")
    }
}

/// Cumulative character offsets of chunk boundaries
pub fn calculate_split_points(text_distribution: &[String]) -> Vec<usize> {
    let mut position = 0;
    text_distribution
        .iter()
        .take(text_distribution.len().saturating_sub(1))
        .map(|chunk| {
            position += chunk.chars().count();
            position
        })
        .collect()
}

/// Serializable snapshot of a manager's maps, keyed by master id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipState {
    #[serde(default)]
    pub relationships: BTreeMap<String, MotherRelationship>,
    #[serde(default)]
    pub chain_metadata: BTreeMap<String, OverflowChainMetadata>,
}

impl RelationshipState {
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty() && self.chain_metadata.is_empty()
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, StateError> {
        serde_json::to_string_pretty(self).map_err(|e| StateError::Serialize(e.to_string()))
    }

    /// Parse a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        serde_json::from_str(json).map_err(|e| StateError::Deserialize(e.to_string()))
    }
}

/// Base-26 letter suffix: 1 → A, 26 → Z, 27 → AA, 28 → AB
pub fn letter_suffix(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Id of the `index`-th child (1-based) of `master_id`
pub fn child_region_id(master_id: &str, index: usize) -> String {
    format!("{}{}", master_id, letter_suffix(index))
}

/// Family root of a region id
///
/// The trailing uppercase suffix is dropped and the numeric run before it is
/// the root (`mother_2A` → `2`). Ids without digits fall back to the id with
/// its suffix removed (`labelB` → `label`).
pub fn family_root(region_id: &str) -> String {
    if let Some(caps) = FAMILY_ID_PATTERN.captures(region_id) {
        let root = caps.name("root").map_or("", |m| m.as_str());
        if !root.is_empty() {
            return root.to_string();
        }
        let stem = caps.name("stem").map_or("", |m| m.as_str());
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    region_id.to_string()
}

/// Whether `child_id` is `master_id` followed by a letter suffix
pub fn is_suffixed_child(master_id: &str, child_id: &str) -> bool {
    child_id
        .strip_prefix(master_id)
        .is_some_and(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_uppercase()))
}

/// Whether two ids belong to the same family
///
/// Generated child ids always belong to their master's family, even when the
/// master id is itself made of uppercase letters (`CARE` and `CAREA`).
pub fn same_family(a: &str, b: &str) -> bool {
    is_suffixed_child(a, b) || is_suffixed_child(b, a) || family_root(a) == family_root(b)
}

/// Preferred area for a child region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionTarget {
    Adjacent,
    Opposite,
    Diagonal,
    Corner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutHint {
    SameSide,
    DifferentSide,
    SystematicDistribution,
    StandardOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPriority {
    BalancedDistribution,
    QuadrantDistribution,
    MaximumSpread,
    SimpleOverflow,
}

/// Advisory placement for one child region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionPlacement {
    pub target_region: RegionTarget,
    pub layout_hint: LayoutHint,
    pub priority: PlacementPriority,
}

/// Placement attached to children of chains with three or more regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiRegionPlacement {
    /// 1-based child index
    pub child_index: usize,
    /// Regions in the chain, master included
    pub total_regions: usize,
    pub placement: RegionPlacement,
}

/// Pick a placement hint for child `child_index` of a chain of `total_regions`
pub fn determine_placement(child_index: usize, total_regions: usize) -> RegionPlacement {
    let cycle_index = child_index.saturating_sub(1);
    match total_regions {
        3 => {
            if child_index == 1 {
                RegionPlacement {
                    target_region: RegionTarget::Adjacent,
                    layout_hint: LayoutHint::SameSide,
                    priority: PlacementPriority::BalancedDistribution,
                }
            } else {
                RegionPlacement {
                    target_region: RegionTarget::Opposite,
                    layout_hint: LayoutHint::DifferentSide,
                    priority: PlacementPriority::BalancedDistribution,
                }
            }
        }
        4 => {
            const TARGETS: [RegionTarget; 3] = [RegionTarget::Adjacent, RegionTarget::Opposite, RegionTarget::Diagonal];
            RegionPlacement {
                target_region: TARGETS[cycle_index % TARGETS.len()],
                layout_hint: if child_index <= 2 {
                    LayoutHint::SameSide
                } else {
                    LayoutHint::DifferentSide
                },
                priority: PlacementPriority::QuadrantDistribution,
            }
        }
        n if n >= 5 => {
            const TARGETS: [RegionTarget; 4] = [
                RegionTarget::Adjacent,
                RegionTarget::Opposite,
                RegionTarget::Diagonal,
                RegionTarget::Corner,
            ];
            RegionPlacement {
                target_region: TARGETS[cycle_index % TARGETS.len()],
                layout_hint: LayoutHint::SystematicDistribution,
                priority: PlacementPriority::MaximumSpread,
            }
        }
        _ => RegionPlacement {
            target_region: RegionTarget::Adjacent,
            layout_hint: LayoutHint::StandardOverflow,
            priority: PlacementPriority::SimpleOverflow,
        },
    }
}

/// Everything the editor needs to create a child region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotherConfig {
    /// Id of the new region
    pub id: String,
    /// Display name
    pub name: String,
    /// Master the region overflows from
    pub master_id: String,
    pub content_type: String,
    /// Geometry and typography, copied from the master
    pub region: RegionConfig,
    /// Only set for chains of three or more regions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<MultiRegionPlacement>,
}

impl MotherConfig {
    /// Configuration of child `child_index` in a chain of `total_regions`
    pub fn for_child(master_id: &str, master: &RegionConfig, child_index: usize, total_regions: usize) -> Self {
        let id = child_region_id(master_id, child_index);
        let placement = (total_regions >= 3).then(|| MultiRegionPlacement {
            child_index,
            total_regions,
            placement: determine_placement(child_index, total_regions),
        });

        Self {
            name: id.clone(),
            id,
            master_id: master_id.to_string(),
            content_type: master.content_type.clone(),
            region: master.clone(),
            placement,
        }
    }
}
