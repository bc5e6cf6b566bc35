//! Cluster extraction over raw UTF-8 bytes that may be malformed.
//!
//! Decoding never fails: a byte that does not start a complete, valid UTF-8
//! sequence decodes as U+FFFD REPLACEMENT CHARACTER and consumes exactly that
//! one byte. The replacement is then segmented and measured like any other
//! code point (it is East Asian Ambiguous, so it counts as 1 cell unless
//! ambiguous code points are configured wide).

use crate::cluster::{ClusterState, assemble};
use crate::options::WidthOptions;

/// Decode the code point at the start of `bytes`. Returns the decoded value
/// and how many bytes it used; `bytes` must not be empty.
fn decode(bytes: &[u8]) -> (char, usize) {
    let len = match bytes[0] {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    bytes
        .get(..len)
        .and_then(|seq| std::str::from_utf8(seq).ok())
        .and_then(|s| s.chars().next())
        .map_or((char::REPLACEMENT_CHARACTER, 1), |c| (c, len))
}

/// Lossy UTF-8 decoder yielding `(offset, char)` pairs.
#[derive(Debug, Clone)]
pub struct DecodeUtf8<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DecodeUtf8<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
}

impl Iterator for DecodeUtf8<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.bytes.get(self.pos..).filter(|rest| !rest.is_empty())?;
        let (c, len) = decode(rest);
        let at = self.pos;
        self.pos += len;
        Some((at, c))
    }
}

/// Decode `bytes` into a `String`, one U+FFFD per invalid byte. Unlike
/// `String::from_utf8_lossy` this never collapses a malformed run into a
/// single replacement, so widths agree with [`bytes_width`].
pub fn decode_lossy(bytes: &[u8]) -> String {
    DecodeUtf8::new(bytes).map(|(_, c)| c).collect()
}

/// A grapheme cluster over a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteCluster<'a> {
    pub bytes: &'a [u8],
    pub start: usize,
    pub end: usize,
    pub width: usize,
}

/// Byte twin of [`crate::next_grapheme_cluster`].
pub fn next_grapheme_cluster_bytes<'a>(
    bytes: &'a [u8],
    start: usize,
    state: ClusterState,
    opts: &WidthOptions,
) -> (ByteCluster<'a>, ClusterState) {
    let rest = bytes.get(start..).unwrap_or_default();
    let (len, width, next) = assemble(DecodeUtf8::new(rest), rest.len(), state, opts);
    let cluster = ByteCluster {
        bytes: &rest[..len],
        start,
        end: start + len,
        width,
    };
    (cluster, next)
}

/// Total display width of a UTF-8 byte buffer, malformed or not.
pub fn bytes_width(bytes: &[u8], opts: &WidthOptions) -> usize {
    let mut state = ClusterState::START;
    let mut offset = 0;
    let mut total = 0;
    while offset < bytes.len() {
        let (cluster, next) = next_grapheme_cluster_bytes(bytes, offset, state, opts);
        total += cluster.width;
        offset = cluster.end;
        state = next;
    }
    total
}
