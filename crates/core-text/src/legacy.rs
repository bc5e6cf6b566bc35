//! Legacy rune-by-rune width heuristic.
//!
//! This mode exists for callers that opt out of cluster-aware measurement.
//! It never consults the grapheme property data: every decision comes from
//! direct range tables (the small tables below, plus the `unicode-width`
//! tables for zero-width, double-width and ambiguous code points).
//!
//! Strings are still split into extended grapheme clusters (by
//! `unicode-segmentation`), but each cluster is measured as the width of its
//! first rune with non-zero width. This is a deliberate approximation and can
//! disagree with [`crate::string_width_with`]: for example a text-presentation
//! pictograph followed by VS-16 is 1 here and 2 there.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::bytes::decode_lossy;
use crate::options::WidthOptions;

type Table = &'static [(u32, u32)];

/// Code points that print nothing.
const NONPRINT: Table = &[
    (0x0000, 0x001F),
    (0x007F, 0x009F),
    (0x00AD, 0x00AD),
    (0x070F, 0x070F),
    (0x180B, 0x180E),
    (0x200B, 0x200F),
    (0x2028, 0x202E),
    (0x206A, 0x206F),
    (0xD800, 0xDFFF),
    (0xFEFF, 0xFEFF),
    (0xFFF9, 0xFFFB),
    (0xFFFE, 0xFFFF),
];

/// East Asian Narrow code points.
const NARROW: Table = &[
    (0x0020, 0x007E),
    (0x00A2, 0x00A3),
    (0x00A5, 0x00A6),
    (0x00AC, 0x00AC),
    (0x00AF, 0x00AF),
    (0x27E6, 0x27ED),
    (0x2985, 0x2986),
];

/// Pictographs that are East Asian Neutral or Ambiguous but commonly shown
/// as emoji.
const EMOJI: Table = &[
    (0x203C, 0x203C),
    (0x2049, 0x2049),
    (0x2122, 0x2122),
    (0x2139, 0x2139),
    (0x2194, 0x2199),
    (0x21A9, 0x21AA),
    (0x231A, 0x231B),
    (0x2328, 0x2328),
    (0x2388, 0x2388),
    (0x23CF, 0x23CF),
    (0x23E9, 0x23F3),
    (0x23F8, 0x23FA),
    (0x24C2, 0x24C2),
    (0x25AA, 0x25AB),
    (0x25B6, 0x25B6),
    (0x25C0, 0x25C0),
    (0x25FB, 0x25FE),
    (0x2600, 0x2605),
    (0x2607, 0x2612),
    (0x2614, 0x2685),
    (0x2690, 0x2705),
    (0x2708, 0x2712),
    (0x2714, 0x2714),
    (0x2716, 0x2716),
    (0x271D, 0x271D),
    (0x2721, 0x2721),
    (0x2728, 0x2728),
    (0x2733, 0x2734),
    (0x2744, 0x2744),
    (0x2747, 0x2747),
    (0x274C, 0x274C),
    (0x274E, 0x274E),
    (0x2753, 0x2755),
    (0x2757, 0x2757),
    (0x2763, 0x2767),
    (0x2795, 0x2797),
    (0x27A1, 0x27A1),
    (0x27B0, 0x27B0),
    (0x27BF, 0x27BF),
    (0x2934, 0x2935),
    (0x2B05, 0x2B07),
    (0x2B1B, 0x2B1C),
    (0x2B50, 0x2B50),
    (0x2B55, 0x2B55),
    (0x3030, 0x3030),
    (0x303D, 0x303D),
    (0x3297, 0x3297),
    (0x3299, 0x3299),
    (0x1F000, 0x1F0FF),
    (0x1F10D, 0x1F10F),
    (0x1F12F, 0x1F12F),
    (0x1F16C, 0x1F171),
    (0x1F17E, 0x1F17F),
    (0x1F18E, 0x1F18E),
    (0x1F191, 0x1F19A),
    (0x1F1AD, 0x1F1E5),
    (0x1F201, 0x1F20F),
    (0x1F21A, 0x1F21A),
    (0x1F22F, 0x1F22F),
    (0x1F232, 0x1F23A),
    (0x1F23C, 0x1F23F),
    (0x1F249, 0x1F3FA),
    (0x1F400, 0x1F53D),
    (0x1F546, 0x1F64F),
    (0x1F680, 0x1F6FF),
    (0x1F774, 0x1F77F),
    (0x1F7D5, 0x1F7FF),
    (0x1F80C, 0x1F80F),
    (0x1F848, 0x1F84F),
    (0x1F85A, 0x1F85F),
    (0x1F888, 0x1F88F),
    (0x1F8AE, 0x1F8FF),
    (0x1F90C, 0x1F93A),
    (0x1F93C, 0x1F945),
    (0x1F947, 0x1FAFF),
    (0x1FC00, 0x1FFFD),
];

/// Binary search a sorted, non-overlapping range table.
fn in_table(cp: u32, table: Table) -> bool {
    table
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                core::cmp::Ordering::Less
            } else if lo > cp {
                core::cmp::Ordering::Greater
            } else {
                core::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

fn is_combining(c: char) -> bool {
    c.width() == Some(0)
}

fn is_double_width(c: char) -> bool {
    c.width() == Some(2)
}

fn is_ambiguous(c: char) -> bool {
    c.width() == Some(1) && c.width_cjk() == Some(2)
}

/// Legacy width of a raw code point value: 0, 1 or 2.
pub fn rune_width(cp: u32, opts: &WidthOptions) -> usize {
    if cp > 0x10FFFF {
        return 0;
    }
    if in_table(cp, NONPRINT) {
        return 0;
    }
    // Every remaining value is a scalar value: surrogates are in NONPRINT.
    let Some(c) = char::from_u32(cp) else {
        return 0;
    };

    if !opts.east_asian {
        return match cp {
            0x0000..=0x02FF => 1,
            _ if in_table(cp, NARROW) => 1,
            _ if is_combining(c) => 0,
            _ if is_double_width(c) => 2,
            _ => 1,
        };
    }

    if is_combining(c) {
        0
    } else if in_table(cp, NARROW) {
        1
    } else if is_ambiguous(c) || is_double_width(c) {
        2
    } else if !opts.strict_emoji_neutral && in_table(cp, EMOJI) {
        2
    } else {
        1
    }
}

/// Legacy width of one grapheme cluster: the width of its first rune with
/// non-zero width, or 0 if there is none.
pub fn cluster_width(cluster: &str, opts: &WidthOptions) -> usize {
    cluster
        .chars()
        .map(|c| rune_width(c as u32, opts))
        .find(|&w| w > 0)
        .unwrap_or(0)
}

/// Legacy width of a string.
pub fn string_width(text: &str, opts: &WidthOptions) -> usize {
    text.graphemes(true)
        .map(|cluster| cluster_width(cluster, opts))
        .sum()
}

/// Legacy width of a UTF-8 byte buffer; invalid bytes count as U+FFFD.
pub fn bytes_width(bytes: &[u8], opts: &WidthOptions) -> usize {
    string_width(&decode_lossy(bytes), opts)
}
