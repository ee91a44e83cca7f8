/*!
 * Overflow analysis for a single region.
 *
 * Bundles the capacity parameters, wrap options and split strategy so the
 * editor (or the relationship manager) can go from region + text to the
 * per-region chunks in one call.
 */

use log::debug;
use serde::Serialize;
use std::sync::Arc;

use super::capacity::{compute_capacity, Capacity, CapacityParams, RegionConfig};
use super::split::{
    additional_regions_needed, split_by_character_budget, split_for_overflow, SplitStrategy,
};
use super::width::{AverageCharWidth, WidthEstimator};
use super::wrap::{wrap_text, WrapOptions};
use crate::app_config::Config;

/// Result of analyzing one text against one region
#[derive(Debug, Clone, Serialize)]
pub struct OverflowAnalysis {
    /// Capacity of the region
    pub capacity: Capacity,
    /// The whole text wrapped to the region's width
    pub lines: Vec<String>,
    /// Whether the text needs more than one region
    pub has_overflow: bool,
    /// Regions needed beyond the first one
    pub additional_regions: usize,
    /// Text for each region of the chain, master first
    pub chunks: Vec<String>,
}

impl OverflowAnalysis {
    /// Total number of regions in the chain
    pub fn region_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Capacity, wrapping and splitting in one place
#[derive(Clone)]
pub struct LayoutEngine {
    params: CapacityParams,
    wrap_options: WrapOptions,
    strategy: SplitStrategy,
    character_budget_safety: f64,
    estimator: Option<Arc<dyn WidthEstimator>>,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("params", &self.params)
            .field("wrap_options", &self.wrap_options)
            .field("strategy", &self.strategy)
            .field("character_budget_safety", &self.character_budget_safety)
            .field("custom_estimator", &self.estimator.is_some())
            .finish()
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(CapacityParams::default(), WrapOptions::default(), SplitStrategy::default())
    }
}

impl LayoutEngine {
    pub fn new(params: CapacityParams, wrap_options: WrapOptions, strategy: SplitStrategy) -> Self {
        Self {
            params,
            wrap_options,
            strategy,
            character_budget_safety: 0.9,
            estimator: None,
        }
    }

    /// Build an engine from the application configuration
    pub fn from_config(config: &Config) -> Self {
        let mut engine = Self::new(
            config.layout.capacity_params(),
            config.overflow.wrap_options(&config.layout),
            config.overflow.split_strategy,
        );
        engine.character_budget_safety = config.overflow.character_budget_safety;
        engine
    }

    /// Replace the average-width model with another estimator
    pub fn with_width_estimator(mut self, estimator: Arc<dyn WidthEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Use another split strategy
    pub fn with_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn params(&self) -> &CapacityParams {
        &self.params
    }

    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    /// Capacity of a region
    pub fn capacity(&self, region: &RegionConfig) -> Capacity {
        compute_capacity(&region.geometry, &region.typography, &self.params)
    }

    /// Wrap text to a region of the given capacity
    pub fn wrap(&self, text: &str, capacity: &Capacity) -> Vec<String> {
        match &self.estimator {
            Some(estimator) => wrap_text(text, capacity.effective_width_mm, estimator.as_ref(), &self.wrap_options),
            None => {
                let estimator = AverageCharWidth::for_capacity(capacity);
                wrap_text(text, capacity.effective_width_mm, &estimator, &self.wrap_options)
            }
        }
    }

    /// Analyze text against a region
    pub fn analyze(&self, region: &RegionConfig, text: &str) -> OverflowAnalysis {
        let capacity = self.capacity(region);
        self.analyze_with_capacity(text, capacity)
    }

    /// Analyze text against an already computed capacity
    pub fn analyze_with_capacity(&self, text: &str, capacity: Capacity) -> OverflowAnalysis {
        let lines = self.wrap(text, &capacity);

        let chunks = match self.strategy {
            SplitStrategy::LineGroups => {
                split_for_overflow(text, capacity.max_lines, |t| self.wrap(t, &capacity))
            }
            SplitStrategy::CharacterBudget => {
                let budget = capacity.character_budget(self.character_budget_safety);
                debug!("Character budget: {} chars", budget);
                split_by_character_budget(text, budget)
            }
        };

        let (has_overflow, additional_regions) = match self.strategy {
            SplitStrategy::LineGroups => (
                lines.len() > capacity.max_lines,
                additional_regions_needed(lines.len(), capacity.max_lines),
            ),
            SplitStrategy::CharacterBudget => (chunks.len() > 1, chunks.len().saturating_sub(1)),
        };

        debug!(
            "Wrapped {} lines into {:.1}mm, {} lines per region, {} region(s)",
            lines.len(),
            capacity.effective_width_mm,
            capacity.max_lines,
            chunks.len()
        );

        OverflowAnalysis {
            capacity,
            lines,
            has_overflow,
            additional_regions,
            chunks,
        }
    }
}
