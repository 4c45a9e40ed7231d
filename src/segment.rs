//! Splitting IPA text into segments.
//!
//! A segment is one base character, then any run of combining diacritics
//! (the tie bar U+0361 excluded), then any run of spacing modifier letters.

use regex::Regex;
use std::sync::LazyLock;

// IPA Extensions and Spacing Modifier Letters are contiguous (U+0250-U+02FF).
const BASE: &str = r"[\x{0000}-\x{007F}\x{0370}-\x{03FF}\x{0250}-\x{02FF}œ\x{00C0}-\x{00FF}]";
const COMBINING: &str = r"[\x{0300}-\x{0360}\x{0362}-\x{036F}]*";
const MODIFIERS: &str = r"[\x{02B0}-\x{02FF}]*";

pub static SEG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!("{BASE}{COMBINING}{MODIFIERS}");
    Regex::new(&pattern).expect("valid segment regex")
});

/// Lazily yields the segments of `text` from left to right. Characters that
/// cannot start a segment are skipped.
pub fn segment_text(text: &str) -> impl Iterator<Item = &str> + '_ {
    segment_text_with(text, &SEG_REGEX)
}

/// Like [`segment_text`], with a caller-supplied segment grammar.
pub fn segment_text_with<'t>(
    text: &'t str,
    seg_regex: &'t Regex,
) -> impl Iterator<Item = &'t str> + 't {
    seg_regex.find_iter(text).map(|m| m.as_str())
}
