/*!
 * Overflow splitting.
 *
 * The authoritative method wraps the whole text once and partitions the
 * resulting lines into contiguous groups of `max_lines`, the last group
 * taking whatever remains. The character-budget method estimates chunk
 * boundaries directly from a character count and searches backwards for a
 * sentence end, a space or punctuation. The two can disagree on where a
 * split falls; the line-group method is the default because it respects word
 * boundaries exactly.
 */

use serde::{Deserialize, Serialize};

/// Which method turns overflowing text into per-region chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitStrategy {
    /// Partition wrapped lines into groups of `max_lines`
    #[default]
    LineGroups,
    /// Cut at an estimated character budget
    CharacterBudget,
}

/// Number of regions needed beyond the first one
///
/// A capacity of zero lines means every line needs a region of its own.
pub fn additional_regions_needed(total_lines: usize, max_lines: usize) -> usize {
    if total_lines <= max_lines {
        return 0;
    }
    if max_lines == 0 {
        return total_lines.saturating_sub(1);
    }
    total_lines.div_ceil(max_lines) - 1
}

/// Partition lines into contiguous groups of at most `max_lines`
///
/// Order is preserved and no line appears twice. With `max_lines == 0` each
/// line becomes its own group.
pub fn partition_lines(lines: &[String], max_lines: usize) -> Vec<&[String]> {
    lines.chunks(max_lines.max(1)).collect()
}

/// Join one group of lines back into the text of a region
pub fn join_chunk(lines: &[String]) -> String {
    lines
        .join("\n")
        .trim_matches(|c: char| c == ' ' || c == '\t')
        .to_string()
}

/// Split text into one chunk per region using the line-group method
///
/// `wrap` must be the wrapper of the target region. When everything fits, the
/// text is returned unchanged as the only chunk.
pub fn split_for_overflow<F>(text: &str, max_lines: usize, wrap: F) -> Vec<String>
where
    F: Fn(&str) -> Vec<String>,
{
    let lines = wrap(text);
    if lines.len() <= max_lines {
        return vec![text.to_string()];
    }

    partition_lines(&lines, max_lines)
        .into_iter()
        .map(join_chunk)
        .collect()
}

/// Split text into chunks of at most `budget` characters
///
/// A budget of zero is treated as one character.
pub fn split_by_character_budget(text: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    if text.chars().count() <= budget {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining: Vec<char> = text.trim().chars().collect();

    while !remaining.is_empty() {
        if remaining.len() <= budget {
            chunks.push(remaining.iter().collect());
            break;
        }

        let split = find_split_point(&remaining, budget);
        let head: String = remaining[..split].iter().collect();
        chunks.push(head.trim().to_string());

        let tail: String = remaining[split..].iter().collect();
        remaining = tail.trim().chars().collect();
    }

    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

/// Offset at which to cut `chars`, which is longer than `budget`
fn find_split_point(chars: &[char], budget: usize) -> usize {
    let floor = |ratio: f64| (budget as f64 * ratio).ceil() as usize;

    // Sentence end, kept inside the budget
    for i in (floor(0.7)..budget).rev() {
        if matches!(chars[i], '.' | '!' | '?') {
            return i + 1;
        }
    }

    // Word boundary
    for i in (floor(0.8)..=budget).rev() {
        if chars[i].is_whitespace() {
            return i;
        }
    }

    // Clause punctuation
    for i in (floor(0.85)..budget).rev() {
        if matches!(chars[i], ',' | ';' | ':') {
            return i + 1;
        }
    }

    budget
}
