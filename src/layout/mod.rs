/*!
 * Text layout for label regions.
 *
 * This module contains the capacity and wrapping calculator and the overflow
 * splitter. It is split into several submodules:
 *
 * - `capacity`: Lines and line width available in a region
 * - `width`: Pluggable text width estimation
 * - `wrap`: Greedy, word-preserving line wrapping
 * - `split`: Partitioning wrapped text into per-region chunks
 * - `engine`: One-call analysis of a text against a region
 */

// Re-export main types for easier usage
pub use self::capacity::{
    compute_capacity, Capacity, CapacityParams, FontSizeUnit, Padding, RegionConfig,
    RegionGeometry, Typography,
};
pub use self::engine::{LayoutEngine, OverflowAnalysis};
pub use self::split::{
    additional_regions_needed, partition_lines, split_by_character_budget, split_for_overflow,
    SplitStrategy,
};
pub use self::width::{AverageCharWidth, WidthEstimator};
pub use self::wrap::{wrap_text, BreakMode, WrapOptions};

// Submodules
pub mod capacity;
pub mod engine;
pub mod split;
pub mod width;
pub mod wrap;
