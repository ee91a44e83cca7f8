/*!
 * Tests for script classification and segmentation
 */

use labelflow::language_utils::{classify_char, script_profile, segment_by_script, ScriptTag};

use crate::common;

/// Test that each script range maps to its tag
#[test]
fn test_classify_char_withEachScript_shouldReturnMatchingTag() {
    assert_eq!(classify_char('棉'), ScriptTag::Chinese);
    assert_eq!(classify_char('の'), ScriptTag::Japanese);
    assert_eq!(classify_char('カ'), ScriptTag::Japanese);
    assert_eq!(classify_char('면'), ScriptTag::Korean);
    assert_eq!(classify_char('ق'), ScriptTag::Arabic);
    assert_eq!(classify_char('%'), ScriptTag::Other);
    assert_eq!(classify_char(' '), ScriptTag::Other);
}

/// Test that concatenated segments reproduce the input
#[test]
fn test_segment_by_script_withMixedText_shouldBeLossless() {
    let text = common::multilingual_care_text();
    let segments = segment_by_script(&text);

    let rebuilt: String = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(rebuilt, text);

    for pair in segments.windows(2) {
        assert_ne!(pair[0].language, pair[1].language);
    }
}

/// Test that spaces between two CJK words end the CJK run
#[test]
fn test_segment_by_script_withSpaces_shouldTagSpacesAsOther() {
    let segments = segment_by_script("棉 綿");
    let tags: Vec<ScriptTag> = segments.iter().map(|s| s.language).collect();
    assert_eq!(tags, vec![ScriptTag::Chinese, ScriptTag::Other, ScriptTag::Chinese]);
    assert_eq!(segments[1].text, " ");
}

/// Test that empty text yields no segments
#[test]
fn test_segment_by_script_withEmptyText_shouldReturnNothing() {
    assert!(segment_by_script("").is_empty());
}

/// Test tag names and language metadata
#[test]
fn test_script_tag_withLanguageMetadata_shouldResolveNames() {
    assert_eq!(ScriptTag::Korean.to_string(), "korean");
    assert_eq!("Arabic".parse::<ScriptTag>().unwrap(), ScriptTag::Arabic);
    assert!("klingon".parse::<ScriptTag>().is_err());
    assert_eq!(ScriptTag::Japanese.iso_639_1(), Some("ja"));
    assert_eq!(ScriptTag::Chinese.language_name().as_deref(), Some("Chinese"));
    assert_eq!(ScriptTag::Other.language_name(), None);
}

/// Test the character profile of a mixed text
#[test]
fn test_script_profile_withMixedText_shouldFindDominantScript() {
    let profile = script_profile("棉綿 면");
    assert_eq!(profile.counts.get(&ScriptTag::Chinese), Some(&2));
    assert_eq!(profile.counts.get(&ScriptTag::Korean), Some(&1));
    assert_eq!(profile.dominant_script(), Some(ScriptTag::Chinese));
    assert_eq!(profile.segment_count, 3);
    assert!(profile.is_mixed());

    let latin = script_profile("cotton");
    assert_eq!(latin.dominant_script(), None);
    assert!(!latin.is_mixed());
}
