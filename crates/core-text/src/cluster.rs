//! Streaming grapheme cluster extraction with per-cluster width.
//!
//! Contract:
//! - `next_grapheme_cluster(text, start, state, opts)` returns the cluster that
//!   begins at byte `start` and the state to pass into the following call,
//!   which should start at `cluster.end`.
//! - The returned state remembers the automaton position and the property of
//!   the code point that triggered the boundary, so no code point is ever
//!   classified twice and no earlier text is rescanned.
//! - Guarantees: clusters come out in order, never overlap, and concatenate to
//!   the input. An empty remainder (or a `start` that is out of bounds or not
//!   on a character boundary) yields an empty cluster with width 0 and the
//!   state unchanged.
//!
//! Width assembly inside a cluster:
//! - The first code point contributes its own rune width.
//! - After an Extended_Pictographic start, VS-15 forces the cluster to 1 cell
//!   and VS-16 to 2; nothing else joined to it adds width.
//! - After a Regional Indicator or Hangul L start, joined code points add
//!   nothing (the pair / syllable is already counted).
//! - Otherwise each joined code point adds its own rune width.

use std::iter::FusedIterator;

use crate::machine::{BreakState, transition};
use crate::options::WidthOptions;
use crate::props::{GraphemeProperty, grapheme_property};
use crate::width::rune_width_for;

const VS15: char = '\u{FE0E}';
const VS16: char = '\u{FE0F}';

/// Resumable segmentation state threaded between extractor calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterState {
    /// Automaton position after the most recently classified code point.
    /// `None` means the next call derives everything from scratch.
    machine: Option<BreakState>,
    /// Property of the most recently classified code point.
    property: Option<GraphemeProperty>,
}

impl ClusterState {
    /// Fresh state for the beginning of a text.
    pub const START: Self = Self {
        machine: None,
        property: None,
    };

    /// State after the end of the text was reached: nothing to resume, but
    /// the property of the final code point is still reported.
    const fn restart(last: GraphemeProperty) -> Self {
        Self {
            machine: None,
            property: Some(last),
        }
    }

    /// True if the next call will classify its first code point from scratch.
    pub const fn is_start(&self) -> bool {
        self.machine.is_none()
    }

    /// Automaton position the next call resumes from. `None` for
    /// [`ClusterState::START`] and after the end of the text, where the next
    /// code point is classified from scratch.
    pub const fn machine(&self) -> Option<BreakState> {
        self.machine
    }

    /// Property of the most recently classified code point, if any.
    pub const fn last_property(&self) -> Option<GraphemeProperty> {
        self.property
    }

    fn resume(&self) -> Option<(BreakState, GraphemeProperty)> {
        Some((self.machine?, self.property?))
    }
}

impl Default for ClusterState {
    fn default() -> Self {
        Self::START
    }
}

/// One grapheme cluster: its text, byte span in the source and cell width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub width: usize,
}

impl Cluster<'_> {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Assemble one cluster from `chars`, which yields `(offset, char)` pairs
/// relative to the start of a slice of `len` bytes.
///
/// Returns the cluster length in bytes, its width and the next state. An
/// exhausted iterator returns `(0, 0, state)`.
pub(crate) fn assemble<I>(
    mut chars: I,
    len: usize,
    state: ClusterState,
    opts: &WidthOptions,
) -> (usize, usize, ClusterState)
where
    I: Iterator<Item = (usize, char)>,
{
    let Some((_, first)) = chars.next() else {
        return (0, 0, state);
    };

    let (mut machine, first_prop) = match state.resume() {
        Some(resumed) => resumed,
        None => {
            let prop = grapheme_property(first);
            (transition(None, prop).0, prop)
        }
    };
    let mut width = rune_width_for(first, first_prop, opts);
    let mut last_prop = first_prop;

    for (offset, c) in chars {
        let prop = grapheme_property(c);
        let (next, boundary) = transition(Some(machine), prop);
        if boundary {
            let state = ClusterState {
                machine: Some(next),
                property: Some(prop),
            };
            return (offset, width, state);
        }
        machine = next;
        last_prop = prop;

        match first_prop {
            GraphemeProperty::ExtendedPictographic => match c {
                VS15 => width = 1,
                VS16 => width = 2,
                _ => {}
            },
            GraphemeProperty::RegionalIndicator | GraphemeProperty::L => {}
            _ => width += rune_width_for(c, prop, opts),
        }
    }

    (len, width, ClusterState::restart(last_prop))
}

/// Extract the grapheme cluster starting at byte `start` of `text`.
pub fn next_grapheme_cluster<'a>(
    text: &'a str,
    start: usize,
    state: ClusterState,
    opts: &WidthOptions,
) -> (Cluster<'a>, ClusterState) {
    let Some(rest) = text.get(start..) else {
        let empty = Cluster {
            text: "",
            start,
            end: start,
            width: 0,
        };
        return (empty, state);
    };

    let (len, width, next) = assemble(rest.char_indices(), rest.len(), state, opts);
    let cluster = Cluster {
        text: &rest[..len],
        start,
        end: start + len,
        width,
    };
    (cluster, next)
}

/// Total display width of `text` with default options.
pub fn string_width(text: &str) -> usize {
    string_width_with(text, &WidthOptions::DEFAULT)
}

/// Total display width of `text`: the sum of its cluster widths.
pub fn string_width_with(text: &str, opts: &WidthOptions) -> usize {
    let mut state = ClusterState::START;
    let mut offset = 0;
    let mut total = 0;
    while offset < text.len() {
        let (cluster, next) = next_grapheme_cluster(text, offset, state, opts);
        total += cluster.width;
        offset = cluster.end;
        state = next;
    }
    total
}

/// Number of grapheme clusters in `text`.
pub fn grapheme_count(text: &str) -> usize {
    Graphemes::new(text, WidthOptions::DEFAULT).count()
}

/// Visual column of byte offset `byte`: the width of every cluster that
/// starts before it. Offsets inside a cluster count that whole cluster.
pub fn column_at(text: &str, byte: usize, opts: &WidthOptions) -> usize {
    Graphemes::new(text, *opts)
        .take_while(|cluster| cluster.start < byte)
        .map(|cluster| cluster.width)
        .sum()
}

/// Iterator over the grapheme clusters of a string.
#[derive(Debug, Clone)]
pub struct Graphemes<'a> {
    text: &'a str,
    offset: usize,
    state: ClusterState,
    opts: WidthOptions,
}

impl<'a> Graphemes<'a> {
    pub fn new(text: &'a str, opts: WidthOptions) -> Self {
        Self {
            text,
            offset: 0,
            state: ClusterState::START,
            opts,
        }
    }

    /// The part of the text not yet yielded.
    pub fn remainder(&self) -> &'a str {
        &self.text[self.offset..]
    }
}

impl<'a> Iterator for Graphemes<'a> {
    type Item = Cluster<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.text.len() {
            return None;
        }
        let (cluster, state) =
            next_grapheme_cluster(self.text, self.offset, self.state, &self.opts);
        self.offset = cluster.end;
        self.state = state;
        Some(cluster)
    }
}

impl FusedIterator for Graphemes<'_> {}
