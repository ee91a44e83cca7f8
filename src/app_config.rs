use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::layout::capacity::{
    CapacityParams, FontSizeUnit, Padding, RegionConfig, RegionGeometry, Typography,
};
use crate::layout::split::SplitStrategy;
use crate::layout::wrap::{BreakMode, WrapOptions};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Region geometry, typography and measurement factors
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Overflow splitting behaviour
    #[serde(default)]
    pub overflow: OverflowSettings,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Every factor that feeds the capacity calculation for a label region
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LayoutConfig {
    /// Region width in millimeters
    #[serde(default = "default_region_width")]
    pub region_width_mm: f64,

    /// Region height in millimeters
    #[serde(default = "default_region_height")]
    pub region_height_mm: f64,

    /// Padding inside the region, in millimeters
    #[serde(default = "default_padding")]
    pub padding: Padding,

    /// Font family name (informational, measurement is approximate)
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Nominal font size, expressed in `font_size_unit`
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Unit of `font_size`
    #[serde(default)]
    pub font_size_unit: FontSizeUnit,

    /// Line spacing multiplier
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f64,

    /// Marker that forces a manual line break
    #[serde(default = "default_line_break_symbol")]
    pub line_break_symbol: String,

    /// Canvas zoom factor applied to the font size
    #[serde(default = "default_zoom")]
    pub zoom: f64,

    /// Pixels per millimeter (96 DPI)
    #[serde(default = "default_mm_to_px")]
    pub mm_to_px: f64,

    /// Width in millimeters kept free at the end of every line
    #[serde(default = "default_safety_buffer")]
    pub safety_buffer_mm: f64,

    /// Smallest font size the canvas renders, in pixels
    #[serde(default = "default_min_font_px")]
    pub min_font_px: f64,

    /// Average glyph width as a fraction of the font size
    ///
    /// This is an approximation: real glyph widths vary per font and per script,
    /// and CJK or Arabic glyphs deviate noticeably from the Latin average.
    #[serde(default = "default_char_width_ratio")]
    pub char_width_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            region_width_mm: default_region_width(),
            region_height_mm: default_region_height(),
            padding: default_padding(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_size_unit: FontSizeUnit::default(),
            line_spacing: default_line_spacing(),
            line_break_symbol: default_line_break_symbol(),
            zoom: default_zoom(),
            mm_to_px: default_mm_to_px(),
            safety_buffer_mm: default_safety_buffer(),
            min_font_px: default_min_font_px(),
            char_width_ratio: default_char_width_ratio(),
        }
    }
}

impl LayoutConfig {
    /// Region geometry described by this configuration
    pub fn geometry(&self) -> RegionGeometry {
        RegionGeometry {
            width_mm: self.region_width_mm,
            height_mm: self.region_height_mm,
            padding: self.padding,
        }
    }

    /// Typography described by this configuration
    pub fn typography(&self) -> Typography {
        Typography {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            unit: self.font_size_unit,
            line_spacing: self.line_spacing,
        }
    }

    /// Measurement constants for the capacity calculator
    pub fn capacity_params(&self) -> CapacityParams {
        CapacityParams {
            safety_buffer_mm: self.safety_buffer_mm,
            mm_to_px: self.mm_to_px,
            zoom: self.zoom,
            min_font_px: self.min_font_px,
            char_width_ratio: self.char_width_ratio,
        }
    }

    /// Region configuration handed to the engine and the relationship manager
    pub fn region_config(&self, name: &str, content_type: &str) -> RegionConfig {
        RegionConfig {
            name: name.to_string(),
            content_type: content_type.to_string(),
            geometry: self.geometry(),
            typography: self.typography(),
        }
    }
}

/// Settings controlling how overflowing text is split across regions
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OverflowSettings {
    /// Which splitting strategy produces the chunks
    #[serde(default)]
    pub split_strategy: SplitStrategy,

    /// How lines are broken
    #[serde(default)]
    pub break_mode: BreakMode,

    /// Content type recorded on new relationships
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Fraction of the estimated character capacity the character-budget
    /// splitter may use
    #[serde(default = "default_character_budget_safety")]
    pub character_budget_safety: f64,
}

impl Default for OverflowSettings {
    fn default() -> Self {
        Self {
            split_strategy: SplitStrategy::default(),
            break_mode: BreakMode::default(),
            content_type: default_content_type(),
            character_budget_safety: default_character_budget_safety(),
        }
    }
}

impl OverflowSettings {
    /// Wrap options derived from these settings and the layout's break marker
    pub fn wrap_options(&self, layout: &LayoutConfig) -> WrapOptions {
        WrapOptions {
            line_break: layout.line_break_symbol.clone(),
            mode: self.break_mode,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_region_width() -> f64 {
    40.0
}

fn default_region_height() -> f64 {
    90.0
}

fn default_padding() -> Padding {
    Padding::uniform(4.0)
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_font_size() -> f64 {
    10.0
}

fn default_line_spacing() -> f64 {
    1.2
}

fn default_line_break_symbol() -> String {
    "\n".to_string()
}

fn default_zoom() -> f64 {
    1.0
}

fn default_mm_to_px() -> f64 {
    3.779527559 // 96 DPI
}

fn default_safety_buffer() -> f64 {
    1.5
}

fn default_min_font_px() -> f64 {
    6.0
}

fn default_char_width_ratio() -> f64 {
    0.6 // Rough Arial average
}

fn default_content_type() -> String {
    "new-comp-trans".to_string()
}

fn default_character_budget_safety() -> f64 {
    0.9
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;

        if !(layout.font_size > 0.0) {
            return Err(anyhow!("Font size must be positive, got {}", layout.font_size));
        }
        if !(layout.line_spacing > 0.0) {
            return Err(anyhow!("Line spacing must be positive, got {}", layout.line_spacing));
        }
        if !(layout.mm_to_px > 0.0) {
            return Err(anyhow!("mm_to_px must be positive, got {}", layout.mm_to_px));
        }
        if !(layout.zoom > 0.0) {
            return Err(anyhow!("Zoom must be positive, got {}", layout.zoom));
        }
        if !(layout.char_width_ratio > 0.0) {
            return Err(anyhow!("Character width ratio must be positive, got {}", layout.char_width_ratio));
        }
        if layout.line_break_symbol.is_empty() {
            return Err(anyhow!("Line break symbol cannot be empty"));
        }
        if layout.region_width_mm < 0.0 || layout.region_height_mm < 0.0 {
            return Err(anyhow!(
                "Region dimensions cannot be negative ({} x {})",
                layout.region_width_mm,
                layout.region_height_mm
            ));
        }
        if layout.padding.has_negative() {
            return Err(anyhow!("Padding cannot be negative"));
        }
        if layout.safety_buffer_mm < 0.0 {
            return Err(anyhow!("Safety buffer cannot be negative"));
        }

        let safety = self.overflow.character_budget_safety;
        if !(safety > 0.0 && safety <= 1.0) {
            return Err(anyhow!("Character budget safety must be in (0, 1], got {}", safety));
        }
        if self.overflow.content_type.trim().is_empty() {
            return Err(anyhow!("Content type cannot be empty"));
        }

        Ok(())
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))?;

        Ok(())
    }

    /// Load the configuration, writing a default one first when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }
}
