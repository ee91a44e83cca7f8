/*!
 * Region capacity calculation.
 *
 * Converts region geometry and typography into the number of lines that fit
 * vertically and the width a single line may occupy. All lengths are in
 * millimeters. Degenerate geometry never fails: it yields zero lines or a
 * non-positive effective width, which callers read as "nothing fits".
 */

use serde::{Deserialize, Serialize};

/// Padding on the four sides of a region, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    /// Same padding on every side
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Whether any side is negative
    pub fn has_negative(&self) -> bool {
        self.top < 0.0 || self.right < 0.0 || self.bottom < 0.0 || self.left < 0.0
    }
}

/// Rectangle of a label region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionGeometry {
    /// Width in millimeters
    pub width_mm: f64,
    /// Height in millimeters
    pub height_mm: f64,
    /// Inner padding
    #[serde(default)]
    pub padding: Padding,
}

/// Unit of a nominal font size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSizeUnit {
    #[default]
    Px,
    Pt,
    Mm,
}

/// Typography of a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    /// Font family (informational)
    pub font_family: String,
    /// Nominal font size in `unit`
    pub font_size: f64,
    /// Unit of `font_size`
    #[serde(default)]
    pub unit: FontSizeUnit,
    /// Line spacing multiplier
    pub line_spacing: f64,
}

impl Typography {
    /// Font size in pixels before zoom
    pub fn font_size_px(&self, mm_to_px: f64) -> f64 {
        match self.unit {
            FontSizeUnit::Px => self.font_size,
            FontSizeUnit::Pt => self.font_size * 4.0 / 3.0,
            FontSizeUnit::Mm => self.font_size * mm_to_px,
        }
    }
}

/// A named region as the editor describes it to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Display name of the region
    pub name: String,
    /// Kind of content held by the region, e.g. `new-comp-trans`
    pub content_type: String,
    /// Rectangle and padding
    pub geometry: RegionGeometry,
    /// Font settings
    pub typography: Typography,
}

/// Measurement constants shared by every region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityParams {
    /// Width kept free at the end of each line, in millimeters
    pub safety_buffer_mm: f64,
    /// Pixels per millimeter
    pub mm_to_px: f64,
    /// Canvas zoom applied to the font size
    pub zoom: f64,
    /// Floor for the rendered font size, in pixels
    pub min_font_px: f64,
    /// Average glyph width as a fraction of the font size
    pub char_width_ratio: f64,
}

impl Default for CapacityParams {
    fn default() -> Self {
        Self {
            safety_buffer_mm: 1.5,
            mm_to_px: 3.779527559,
            zoom: 1.0,
            min_font_px: 6.0,
            char_width_ratio: 0.6,
        }
    }
}

/// Capacity of one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    /// Lines that fit vertically
    pub max_lines: usize,
    /// Width a line may occupy; zero or negative means nothing fits
    pub effective_width_mm: f64,
    /// Width inside the padding, clamped to zero
    pub available_width_mm: f64,
    /// Height inside the padding, clamped to zero
    pub available_height_mm: f64,
    /// Height of one line
    pub line_height_mm: f64,
    /// Rendered font size
    pub font_size_mm: f64,
    /// Estimated average glyph width
    pub char_width_mm: f64,
}

impl Capacity {
    /// Whether no text at all can be placed in the region
    pub fn fits_nothing(&self) -> bool {
        self.max_lines == 0 || self.effective_width_mm <= 0.0
    }

    /// Estimated number of average-width characters per line
    pub fn estimated_chars_per_line(&self) -> usize {
        if self.char_width_mm <= 0.0 || self.effective_width_mm <= 0.0 {
            return 0;
        }
        (self.effective_width_mm / self.char_width_mm).floor() as usize
    }

    /// Character budget for the character-count splitter
    pub fn character_budget(&self, safety: f64) -> usize {
        let total = (self.estimated_chars_per_line() * self.max_lines) as f64;
        (total * safety).floor().max(0.0) as usize
    }
}

/// Compute how many lines fit in a region and how wide each may be
pub fn compute_capacity(
    geometry: &RegionGeometry,
    typography: &Typography,
    params: &CapacityParams,
) -> Capacity {
    let padding = &geometry.padding;
    let available_width_mm = (geometry.width_mm - padding.left - padding.right).max(0.0);
    let available_height_mm = (geometry.height_mm - padding.top - padding.bottom).max(0.0);
    let effective_width_mm = available_width_mm - params.safety_buffer_mm;

    let font_size_px = (typography.font_size_px(params.mm_to_px) * params.zoom).max(params.min_font_px);
    let font_size_mm = if params.mm_to_px > 0.0 {
        font_size_px / params.mm_to_px
    } else {
        0.0
    };
    let line_height_mm = font_size_mm * typography.line_spacing;

    let max_lines = if line_height_mm > 0.0 && line_height_mm.is_finite() {
        (available_height_mm / line_height_mm).floor().max(0.0) as usize
    } else {
        0
    };

    Capacity {
        max_lines,
        effective_width_mm,
        available_width_mm,
        available_height_mm,
        line_height_mm,
        font_size_mm,
        char_width_mm: font_size_mm * params.char_width_ratio,
    }
}
