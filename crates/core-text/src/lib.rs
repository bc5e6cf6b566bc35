//! Grapheme-cluster-aware monospace display width.
//!
//! Text is split into extended grapheme clusters (UAX #29, GB9c aside) by a
//! resumable state machine, and each cluster is assigned the number of
//! terminal cells it occupies. The main entry points are:
//!
//! - [`string_width`] / [`string_width_with`]: total width of a string.
//! - [`next_grapheme_cluster`]: one cluster at a time, with a [`ClusterState`]
//!   that lets the caller resume without rescanning.
//! - [`Graphemes`]: the same as an iterator.
//! - [`rune_width`] / [`code_point_width`]: width of a lone code point.
//! - [`bytes_width`] / [`next_grapheme_cluster_bytes`] / [`measure_bytes`]:
//!   the byte-buffer twins, tolerant of malformed UTF-8.
//! - [`legacy`]: the older rune-by-rune heuristic, kept for callers that
//!   explicitly opt out of cluster measurement.
//!
//! All widths are in cells. The cluster-rule paths never allocate.

pub mod bytes;
pub mod cluster;
pub mod legacy;
pub mod machine;
pub mod options;
pub mod props;
pub mod segment;
pub mod width;

pub use bytes::{
    ByteCluster, DecodeUtf8, bytes_width, decode_lossy, next_grapheme_cluster_bytes,
};
pub use cluster::{
    Cluster, ClusterState, Graphemes, column_at, grapheme_count, next_grapheme_cluster,
    string_width, string_width_with,
};
pub use machine::BreakState;
pub use options::{AmbiguousWidth, WidthOptions};
pub use props::{EastAsianClass, GraphemeProperty};
pub use width::{code_point_width, rune_width, rune_width_for, rune_width_with};

/// Width of `text` using either the cluster rule or, when `legacy` is set,
/// the rune-by-rune heuristic.
pub fn measure(text: &str, opts: &WidthOptions, legacy: bool) -> usize {
    if legacy {
        legacy::string_width(text, opts)
    } else {
        string_width_with(text, opts)
    }
}

/// Byte twin of [`measure`]; malformed UTF-8 is measured, never rejected.
pub fn measure_bytes(bytes: &[u8], opts: &WidthOptions, legacy: bool) -> usize {
    if legacy {
        legacy::bytes_width(bytes, opts)
    } else {
        bytes_width(bytes, opts)
    }
}
