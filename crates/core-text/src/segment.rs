//! Owned segmentation adapter.
//!
//! Contract:
//! - Input: `&str` raw input plus the width options to measure with.
//! - Output: `Vec<Segment>` where each segment is one grapheme cluster with
//!   absolute byte offsets and a display width (terminal cells).
//!   `normalize_and_segment` first converts to NFC and reports offsets into
//!   the normalized string.
//! - Guarantees: segments are in order, non-overlapping and cover the entire
//!   (normalized) string when concatenated.
//! - Does not log content; callers should avoid logging raw text.

use unicode_normalization::UnicodeNormalization;

use crate::cluster::Graphemes;
use crate::options::WidthOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub cluster: String,
    pub start: usize, // byte offset (inclusive)
    pub end: usize,   // byte offset (exclusive)
    pub width: usize,
}

/// Segment `input` into owned grapheme clusters with widths and byte ranges.
pub fn segment(input: &str, opts: &WidthOptions) -> Vec<Segment> {
    Graphemes::new(input, *opts)
        .map(|c| Segment {
            cluster: c.text.to_string(),
            start: c.start,
            end: c.end,
            width: c.width,
        })
        .collect()
}

/// Normalize to NFC and segment into grapheme clusters with widths and byte ranges.
pub fn normalize_and_segment(input: &str, opts: &WidthOptions) -> (String, Vec<Segment>) {
    let normalized: String = input.nfc().collect();
    let segments = segment(&normalized, opts);
    (normalized, segments)
}
