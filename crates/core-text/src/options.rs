//! Width configuration threaded explicitly into every measurement call.
//!
//! There is no process-wide toggle: callers build a `WidthOptions` once
//! (usually through `core-config`) and pass it by reference.

/// Cell width used for East Asian Ambiguous code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguousWidth {
    #[default]
    Narrow,
    Wide,
}

impl AmbiguousWidth {
    pub const fn cells(self) -> usize {
        match self {
            Self::Narrow => 1,
            Self::Wide => 2,
        }
    }

    /// Map a configured cell count (1 or 2) to a variant.
    pub const fn from_cells(cells: u8) -> Option<Self> {
        match cells {
            1 => Some(Self::Narrow),
            2 => Some(Self::Wide),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthOptions {
    /// East Asian context. Only the legacy heuristic reads this directly;
    /// the cluster rule looks at `ambiguous_width`.
    pub east_asian: bool,
    pub ambiguous_width: AmbiguousWidth,
    /// Legacy heuristic: when false (and `east_asian` is set), ambiguous,
    /// emoji and narrow code points are all counted as wide.
    pub strict_emoji_neutral: bool,
}

impl WidthOptions {
    pub const DEFAULT: Self = Self {
        east_asian: false,
        ambiguous_width: AmbiguousWidth::Narrow,
        strict_emoji_neutral: true,
    };

    /// East Asian context with ambiguous code points counted as wide.
    pub const fn east_asian() -> Self {
        Self {
            east_asian: true,
            ambiguous_width: AmbiguousWidth::Wide,
            strict_emoji_neutral: true,
        }
    }

    pub const fn with_ambiguous_width(mut self, width: AmbiguousWidth) -> Self {
        self.ambiguous_width = width;
        self
    }
}

impl Default for WidthOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}
