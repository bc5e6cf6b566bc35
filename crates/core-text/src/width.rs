//! Per-code-point display width rule used while assembling clusters.
//!
//! Width Precedence Order (first match wins):
//! 1. Control, CR, LF, Extend, ZWJ: 0.
//! 2. Regional Indicator: 2.
//! 3. Extended Pictographic: 2 with default emoji presentation, else 1.
//! 4. U+2E3A TWO-EM DASH: 3; U+2E3B THREE-EM DASH: 4.
//! 5. East Asian Wide or Fullwidth: 2.
//! 6. East Asian Ambiguous: `WidthOptions::ambiguous_width`.
//! 7. Everything else: 1.
//!
//! Invariants:
//! - The result is always in `0..=4`.
//! - Widths of 3 and 4 only ever come from the two em-dash code points.
//! - Cluster-level adjustments (variation selectors, joined emoji, flags,
//!   Hangul jamo) are the extractor's business, not this module's.

use crate::options::WidthOptions;
use crate::props::{self, EastAsianClass, GraphemeProperty};

const TWO_EM_DASH: char = '\u{2E3A}';
const THREE_EM_DASH: char = '\u{2E3B}';

/// Width of `c` given its already-resolved grapheme property.
#[inline]
pub fn rune_width_for(c: char, prop: GraphemeProperty, opts: &WidthOptions) -> usize {
    match prop {
        p if p.is_zero_width() => return 0,
        GraphemeProperty::RegionalIndicator => return 2,
        GraphemeProperty::ExtendedPictographic => {
            return if props::is_emoji_presentation(c) { 2 } else { 1 };
        }
        _ => {}
    }

    match c {
        TWO_EM_DASH => return 3,
        THREE_EM_DASH => return 4,
        _ => {}
    }

    match props::east_asian_width(c) {
        EastAsianClass::Wide => 2,
        EastAsianClass::Ambiguous => opts.ambiguous_width.cells(),
        EastAsianClass::Narrow => 1,
    }
}

/// Width of a single code point without cluster context, default options.
#[inline]
pub fn rune_width(c: char) -> usize {
    rune_width_with(c, &WidthOptions::DEFAULT)
}

/// Width of a single code point without cluster context.
#[inline]
pub fn rune_width_with(c: char, opts: &WidthOptions) -> usize {
    rune_width_for(c, props::grapheme_property(c), opts)
}

/// Width of a raw code point value. Anything that is not a Unicode scalar
/// value (above U+10FFFF, or a surrogate) has width 0.
pub fn code_point_width(cp: u32, opts: &WidthOptions) -> usize {
    char::from_u32(cp).map_or(0, |c| rune_width_with(c, opts))
}
