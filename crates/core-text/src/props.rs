//! Character property lookups consumed by segmentation and width.
//!
//! All data comes from the `icu_properties` compiled tables, which are
//! `'static` and read-only, so lookups are safe from any thread without
//! synchronization. Nothing in this module allocates.
//!
//! Two independent questions are answered here:
//! - Which grapheme-cluster-break class does a code point belong to? The
//!   Extended_Pictographic emoji property is folded into this class because
//!   the boundary rules treat it as one more mutually exclusive category.
//! - Which East Asian Width bucket does it fall into, and does it default to
//!   emoji presentation?

use icu_properties::props::{
    EastAsianWidth, EmojiPresentation, ExtendedPictographic, GraphemeClusterBreak,
};
use icu_properties::{CodePointMapData, CodePointSetData};

/// Grapheme cluster break class of a single code point.
///
/// Mirrors the UAX #29 `Grapheme_Cluster_Break` values that still occur in
/// current Unicode data, plus `ExtendedPictographic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphemeProperty {
    Control,
    CR,
    LF,
    Extend,
    ZWJ,
    RegionalIndicator,
    ExtendedPictographic,
    Prepend,
    SpacingMark,
    L,
    V,
    T,
    LV,
    LVT,
    Other,
}

impl GraphemeProperty {
    /// Control, CR, LF, Extend and ZWJ never occupy a cell of their own.
    pub const fn is_zero_width(self) -> bool {
        matches!(
            self,
            Self::Control | Self::CR | Self::LF | Self::Extend | Self::ZWJ
        )
    }
}

/// East Asian Width bucket as far as cell width is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EastAsianClass {
    /// Fullwidth (F) or Wide (W).
    Wide,
    /// Ambiguous (A).
    Ambiguous,
    /// Narrow, Halfwidth or Neutral.
    Narrow,
}

/// Classify `c` for the grapheme boundary automaton.
pub fn grapheme_property(c: char) -> GraphemeProperty {
    let gcb = CodePointMapData::<GraphemeClusterBreak>::new().get(c);
    match gcb {
        GraphemeClusterBreak::Control => GraphemeProperty::Control,
        GraphemeClusterBreak::CR => GraphemeProperty::CR,
        GraphemeClusterBreak::LF => GraphemeProperty::LF,
        GraphemeClusterBreak::Extend | GraphemeClusterBreak::EModifier => {
            GraphemeProperty::Extend
        }
        GraphemeClusterBreak::ZWJ => GraphemeProperty::ZWJ,
        GraphemeClusterBreak::RegionalIndicator => GraphemeProperty::RegionalIndicator,
        GraphemeClusterBreak::Prepend => GraphemeProperty::Prepend,
        GraphemeClusterBreak::SpacingMark => GraphemeProperty::SpacingMark,
        GraphemeClusterBreak::L => GraphemeProperty::L,
        GraphemeClusterBreak::V => GraphemeProperty::V,
        GraphemeClusterBreak::T => GraphemeProperty::T,
        GraphemeClusterBreak::LV => GraphemeProperty::LV,
        GraphemeClusterBreak::LVT => GraphemeProperty::LVT,
        _ if is_extended_pictographic(c) => GraphemeProperty::ExtendedPictographic,
        // Other, plus the retired E_Base / E_Base_GAZ / Glue_After_Zwj values.
        _ => GraphemeProperty::Other,
    }
}

/// East Asian Width bucket of `c`.
pub fn east_asian_width(c: char) -> EastAsianClass {
    match CodePointMapData::<EastAsianWidth>::new().get(c) {
        EastAsianWidth::Wide | EastAsianWidth::Fullwidth => EastAsianClass::Wide,
        EastAsianWidth::Ambiguous => EastAsianClass::Ambiguous,
        _ => EastAsianClass::Narrow,
    }
}

/// Whether `c` has `Emoji_Presentation=Yes`.
pub fn is_emoji_presentation(c: char) -> bool {
    CodePointSetData::new::<EmojiPresentation>().contains(c)
}

/// Whether `c` has `Extended_Pictographic=Yes`.
pub fn is_extended_pictographic(c: char) -> bool {
    CodePointSetData::new::<ExtendedPictographic>().contains(c)
}
