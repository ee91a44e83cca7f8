/*!
 * Text width estimation.
 *
 * Line wrapping only needs to know how wide a candidate line is. The default
 * estimator multiplies the character count by an average glyph width
 * (`font_size × 0.6`), which is a deliberate approximation: it ignores
 * kerning and per-glyph metrics, and it is noticeably off for CJK and Arabic
 * glyphs. Anything implementing `WidthEstimator` can replace it.
 */

use super::capacity::Capacity;

/// Estimates the rendered width of a string, in millimeters
pub trait WidthEstimator: Send + Sync {
    /// Width of `text` when rendered on a single line
    fn estimate_width(&self, text: &str) -> f64;
}

impl<F> WidthEstimator for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn estimate_width(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Fixed average width per character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageCharWidth {
    /// Width of one character in millimeters
    pub char_width_mm: f64,
}

impl AverageCharWidth {
    pub fn new(char_width_mm: f64) -> Self {
        Self { char_width_mm }
    }

    /// Estimator matching the glyph width computed for a region
    pub fn for_capacity(capacity: &Capacity) -> Self {
        Self::new(capacity.char_width_mm)
    }
}

impl WidthEstimator for AverageCharWidth {
    fn estimate_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width_mm
    }
}
