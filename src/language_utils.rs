use anyhow::{anyhow, Result};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Script utilities for multi-language label text
///
/// This module classifies single characters into a small set of script tags
/// by Unicode range and merges runs of equally tagged characters into
/// segments. Ranges are tested in a fixed priority order: CJK ideographs,
/// Japanese kana, Hangul syllables, Arabic, then the `Other` fallback.
/// Script tag for a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptTag {
    /// CJK unified ideographs (U+4E00..U+9FFF)
    Chinese,
    /// Hiragana and katakana (U+3040..U+30FF)
    Japanese,
    /// Hangul syllables (U+AC00..U+D7AF)
    Korean,
    /// Arabic block (U+0600..U+06FF)
    Arabic,
    /// Everything else, segmented by whitespace
    Other,
}

impl ScriptTag {
    /// Lowercase tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chinese => "chinese",
            Self::Japanese => "japanese",
            Self::Korean => "korean",
            Self::Arabic => "arabic",
            Self::Other => "other",
        }
    }

    /// Whether runs of this script may be broken without spaces
    pub fn is_logographic_or_abjad(&self) -> bool {
        !matches!(self, Self::Other)
    }

    /// ISO 639-1 code of the language most associated with this script
    pub fn iso_639_1(&self) -> Option<&'static str> {
        match self {
            Self::Chinese => Some("zh"),
            Self::Japanese => Some("ja"),
            Self::Korean => Some("ko"),
            Self::Arabic => Some("ar"),
            Self::Other => None,
        }
    }

    /// English name of that language
    pub fn language_name(&self) -> Option<String> {
        self.iso_639_1()
            .and_then(Language::from_639_1)
            .map(|lang| lang.to_name().to_string())
    }
}

impl fmt::Display for ScriptTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScriptTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chinese" => Ok(Self::Chinese),
            "japanese" => Ok(Self::Japanese),
            "korean" => Ok(Self::Korean),
            "arabic" => Ok(Self::Arabic),
            "other" => Ok(Self::Other),
            _ => Err(anyhow!("Invalid script tag: {}", s)),
        }
    }
}

/// A maximal run of characters sharing one script tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSegment {
    /// Segment text, a contiguous slice of the input
    pub text: String,
    /// Tag shared by every character of the segment
    pub language: ScriptTag,
}

/// Classify a single character by Unicode range
pub fn classify_char(ch: char) -> ScriptTag {
    match ch as u32 {
        0x4E00..=0x9FFF => ScriptTag::Chinese,
        0x3040..=0x309F | 0x30A0..=0x30FF => ScriptTag::Japanese,
        0xAC00..=0xD7AF => ScriptTag::Korean,
        0x0600..=0x06FF => ScriptTag::Arabic,
        _ => ScriptTag::Other,
    }
}

/// Split text into runs of equally tagged characters
///
/// Concatenating the returned segments reproduces `text` exactly.
pub fn segment_by_script(text: &str) -> Vec<ScriptSegment> {
    segment_spans(text)
        .into_iter()
        .map(|(start, end, language)| ScriptSegment {
            text: text[start..end].to_string(),
            language,
        })
        .collect()
}

/// Byte spans `(start, end, tag)` of the script runs in `text`
pub(crate) fn segment_spans(text: &str) -> Vec<(usize, usize, ScriptTag)> {
    let mut spans = Vec::new();
    let mut current: Option<(usize, ScriptTag)> = None;

    for (idx, ch) in text.char_indices() {
        let tag = classify_char(ch);
        match current {
            Some((_, current_tag)) if current_tag == tag => {}
            Some((start, current_tag)) => {
                spans.push((start, idx, current_tag));
                current = Some((idx, tag));
            }
            None => current = Some((idx, tag)),
        }
    }

    if let Some((start, tag)) = current {
        spans.push((start, text.len(), tag));
    }

    spans
}

/// Character counts per script for a piece of text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptProfile {
    /// Number of characters per tag
    pub counts: BTreeMap<ScriptTag, usize>,
    /// Number of segments produced by `segment_by_script`
    pub segment_count: usize,
}

impl ScriptProfile {
    /// Non-`Other` script with the most characters, if any
    pub fn dominant_script(&self) -> Option<ScriptTag> {
        self.counts
            .iter()
            .filter(|(tag, _)| tag.is_logographic_or_abjad())
            .max_by_key(|(_, count)| **count)
            .map(|(tag, _)| *tag)
    }

    /// Whether any character needs script-aware handling
    pub fn is_mixed(&self) -> bool {
        self.dominant_script().is_some()
    }
}

/// Count characters per script
pub fn script_profile(text: &str) -> ScriptProfile {
    let mut counts = BTreeMap::new();
    for ch in text.chars() {
        *counts.entry(classify_char(ch)).or_insert(0) += 1;
    }

    ScriptProfile {
        counts,
        segment_count: segment_spans(text).len(),
    }
}
