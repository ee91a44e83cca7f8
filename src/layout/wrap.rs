/*!
 * Greedy line wrapping.
 *
 * Text is first split on the manual line-break marker; every manual line is
 * wrapped on its own and empty manual lines survive as empty output lines.
 * Units are appended to the current line while the estimated width stays
 * within the effective width. A unit that is too wide on its own still gets
 * a line of its own: words are never cut.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use super::width::WidthEstimator;
use crate::language_utils::segment_spans;

/// How a manual line is cut into wrap units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakMode {
    /// Whitespace-separated words are atomic
    #[default]
    Words,
    /// Words are further cut where the script changes, so that CJK and
    /// Arabic runs can move to the next line without a space
    ScriptRuns,
}

/// Wrapping options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapOptions {
    /// Manual line-break marker
    pub line_break: String,
    /// Unit selection
    pub mode: BreakMode,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            line_break: "\n".to_string(),
            mode: BreakMode::Words,
        }
    }
}

/// One atomic piece of a manual line
#[derive(Debug, Clone, Copy)]
struct WrapUnit<'a> {
    text: &'a str,
    /// Continues the previous unit's word, so no space is inserted
    glued: bool,
}

/// Wrap text into lines that fit `effective_width_mm`
///
/// Empty input yields no lines. A string made only of line breaks yields one
/// empty line per manual line.
pub fn wrap_text(
    text: &str,
    effective_width_mm: f64,
    estimator: &dyn WidthEstimator,
    options: &WrapOptions,
) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let separator = if options.line_break.is_empty() {
        "\n"
    } else {
        options.line_break.as_str()
    };

    let mut lines = Vec::new();
    for manual_line in text.split(separator) {
        let trimmed = manual_line.trim();
        if trimmed.is_empty() {
            lines.push(String::new());
            continue;
        }

        let units = match options.mode {
            BreakMode::Words => word_units(trimmed),
            BreakMode::ScriptRuns => script_units(trimmed),
        };
        wrap_units(&units, effective_width_mm, estimator, &mut lines);
    }

    lines
}

fn word_units(line: &str) -> Vec<WrapUnit<'_>> {
    line.split_whitespace()
        .map(|text| WrapUnit { text, glued: false })
        .collect()
}

fn script_units(line: &str) -> Vec<WrapUnit<'_>> {
    let mut units = Vec::new();
    for word in line.split_whitespace() {
        for (index, (start, end, _)) in segment_spans(word).into_iter().enumerate() {
            units.push(WrapUnit {
                text: &word[start..end],
                glued: index > 0,
            });
        }
    }
    units
}

fn wrap_units(
    units: &[WrapUnit<'_>],
    effective_width_mm: f64,
    estimator: &dyn WidthEstimator,
    lines: &mut Vec<String>,
) {
    let mut current = String::new();

    for unit in units {
        let candidate = if current.is_empty() {
            unit.text.to_string()
        } else if unit.glued {
            format!("{}{}", current, unit.text)
        } else {
            format!("{} {}", current, unit.text)
        };

        if estimator.estimate_width(&candidate) <= effective_width_mm {
            current = candidate;
        } else if current.is_empty() {
            debug!("Unit '{}' exceeds {:.2}mm but is kept whole", unit.text, effective_width_mm);
            lines.push(candidate);
        } else {
            lines.push(std::mem::take(&mut current));
            if estimator.estimate_width(unit.text) <= effective_width_mm {
                current = unit.text.to_string();
            } else {
                debug!("Unit '{}' exceeds {:.2}mm but is kept whole", unit.text, effective_width_mm);
                lines.push(unit.text.to_string());
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
}
