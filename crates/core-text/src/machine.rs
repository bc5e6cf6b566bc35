//! Grapheme cluster boundary automaton (UAX #29 extended grapheme clusters).
//!
//! Contract:
//! - Input: the automaton position reached after the previous code point
//!   (`None` at start of text) and the property of the next code point.
//! - Output: the new position and whether a boundary sits immediately before
//!   that next code point.
//! - Pure: the decision depends on nothing but the two inputs, which is what
//!   lets the cluster extractor suspend and resume between calls.
//!
//! Resolution order:
//! 1. An exact `(position, property)` transition.
//! 2. Otherwise the wildcard transitions `(position, any)` and
//!    `(Any, property)`. When both exist the new position comes from the
//!    latter and the boundary decision from whichever rule has the lower
//!    rule number (rules are numbered after their GB identifiers, so lower
//!    means higher precedence).
//! 3. Otherwise GB999: break.
//!
//! Not covered: GB9c (Indic conjunct break).

use crate::props::GraphemeProperty;

/// Position of the automaton after consuming a code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakState {
    Any,
    Cr,
    ControlLf,
    L,
    /// Hangul LV syllable or V jamo seen; V or T may follow.
    LvV,
    /// Hangul LVT syllable or T jamo seen; only T may follow.
    LvtT,
    Prepend,
    /// Extended_Pictographic followed by zero or more Extend.
    Pictographic,
    /// Pictographic sequence ending in ZWJ.
    PictographicZwj,
    RiOdd,
    RiEven,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    to: BreakState,
    boundary: bool,
    rule: u16,
}

/// Rule number for "start something new, boundary decided by others".
const GB_ANY: u16 = 9990;

const fn step(to: BreakState, boundary: bool, rule: u16) -> Option<Transition> {
    Some(Transition { to, boundary, rule })
}

/// Transition table. `prop == None` is the "any property" wildcard.
fn lookup(state: BreakState, prop: Option<GraphemeProperty>) -> Option<Transition> {
    use BreakState as S;
    use GraphemeProperty as P;

    match (state, prop) {
        // GB5: break after controls... (and start tracking them)
        (S::Any, Some(P::CR)) => step(S::Cr, true, 50),
        (S::Any, Some(P::LF)) => step(S::ControlLf, true, 50),
        (S::Any, Some(P::Control)) => step(S::ControlLf, true, 50),

        // GB4: ...and before anything following them.
        (S::Cr, None) => step(S::Any, true, 40),
        (S::ControlLf, None) => step(S::Any, true, 40),

        // GB3
        (S::Cr, Some(P::LF)) => step(S::ControlLf, false, 30),

        // GB6
        (S::Any, Some(P::L)) => step(S::L, true, GB_ANY),
        (S::L, Some(P::L)) => step(S::L, false, 60),
        (S::L, Some(P::V)) => step(S::LvV, false, 60),
        (S::L, Some(P::LV)) => step(S::LvV, false, 60),
        (S::L, Some(P::LVT)) => step(S::LvtT, false, 60),

        // GB7
        (S::Any, Some(P::LV)) => step(S::LvV, true, GB_ANY),
        (S::Any, Some(P::V)) => step(S::LvV, true, GB_ANY),
        (S::LvV, Some(P::V)) => step(S::LvV, false, 70),
        (S::LvV, Some(P::T)) => step(S::LvtT, false, 70),

        // GB8
        (S::Any, Some(P::LVT)) => step(S::LvtT, true, GB_ANY),
        (S::Any, Some(P::T)) => step(S::LvtT, true, GB_ANY),
        (S::LvtT, Some(P::T)) => step(S::LvtT, false, 80),

        // GB9
        (S::Any, Some(P::Extend)) => step(S::Any, false, 90),
        (S::Any, Some(P::ZWJ)) => step(S::Any, false, 90),

        // GB9a
        (S::Any, Some(P::SpacingMark)) => step(S::Any, false, 91),

        // GB9b
        (S::Any, Some(P::Prepend)) => step(S::Prepend, true, GB_ANY),
        (S::Prepend, None) => step(S::Any, false, 92),

        // GB11
        (S::Any, Some(P::ExtendedPictographic)) => step(S::Pictographic, true, GB_ANY),
        (S::Pictographic, Some(P::Extend)) => step(S::Pictographic, false, 110),
        (S::Pictographic, Some(P::ZWJ)) => step(S::PictographicZwj, false, 110),
        (S::PictographicZwj, Some(P::ExtendedPictographic)) => {
            step(S::Pictographic, false, 110)
        }

        // GB12 / GB13
        (S::Any, Some(P::RegionalIndicator)) => step(S::RiOdd, true, GB_ANY),
        (S::RiOdd, Some(P::RegionalIndicator)) => step(S::RiEven, false, 120),
        (S::RiEven, Some(P::RegionalIndicator)) => step(S::RiOdd, true, 120),

        _ => None,
    }
}

/// Advance the automaton by one code point of class `prop`.
///
/// Returns the new position and whether a cluster boundary precedes the code
/// point. With `state == None` (start of text) the boundary is always
/// reported (GB1).
pub fn transition(state: Option<BreakState>, prop: GraphemeProperty) -> (BreakState, bool) {
    let Some(state) = state else {
        let to = lookup(BreakState::Any, Some(prop)).map_or(BreakState::Any, |t| t.to);
        return (to, true);
    };

    if let Some(t) = lookup(state, Some(prop)) {
        return (t.to, t.boundary);
    }

    match (lookup(state, None), lookup(BreakState::Any, Some(prop))) {
        (Some(any_prop), Some(any_state)) => {
            let boundary = if any_prop.rule < any_state.rule {
                any_prop.boundary
            } else {
                any_state.boundary
            };
            (any_state.to, boundary)
        }
        (Some(any_prop), None) => (any_prop.to, any_prop.boundary),
        (None, Some(any_state)) => (any_state.to, any_state.boundary),
        // GB999
        (None, None) => (BreakState::Any, true),
    }
}
