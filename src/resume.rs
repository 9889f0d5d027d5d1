//! Continuation resolver.
//!
//! Every way a suspended position gets resumed goes through [`nmatch`]: a
//! set of continuations crossed with a set of right extents around a pivot.
//! [`skip`] and [`ascend`] are the two directions in which the same cross
//! product is discovered; [`descend`] opens a fresh call.

use crate::descriptor::{Bsr, Continuation, Descriptor};
use crate::error::GllError;
use crate::eval::Delta;
use crate::grammar::{Grammar, NonTermId, Slot, Terminal};

/// Resume each continuation `(slot, l')` at each extent `r` with
/// `l' <= pivot <= r`, emitting `(slot, l', r)` and BSR `(slot, l', pivot, r)`.
///
/// Returns the number of pairs resumed.
pub fn nmatch(pivot: usize, conts: &[Continuation], extents: &[usize], out: &mut Delta) -> usize {
    let mut resumed = 0;
    for c in conts {
        if c.left > pivot {
            continue;
        }
        for &r in extents {
            if pivot > r {
                continue;
            }
            out.descriptors.push(Descriptor::new(c.slot, c.left, r));
            out.bsrs.push(Bsr::new(c.slot, c.left, pivot, r));
            resumed += 1;
        }
    }
    resumed
}

/// A newly subscribed continuation meets extents already recorded for the
/// call it waits on. `pos` is the call's left extent.
pub fn skip(pos: usize, cont: Continuation, extents: &[usize], out: &mut Delta) -> usize {
    nmatch(pos, std::slice::from_ref(&cont), extents, out)
}

/// A call `(X, left)` has just reached `right`; wake every waiting continuation.
pub fn ascend(left: usize, conts: &[Continuation], right: usize, out: &mut Delta) -> usize {
    nmatch(left, conts, std::slice::from_ref(&right), out)
}

/// Open the call `(nonterm, pos)`: one descriptor per alternative at its first slot.
pub fn descend<T: Terminal>(
    grammar: &Grammar<T>,
    nonterm: NonTermId,
    pos: usize,
    out: &mut Delta,
) -> Result<usize, GllError> {
    let alts = grammar.alternatives(nonterm);
    if alts.is_empty() {
        return Err(GllError::UndefinedNonTerminal {
            name: grammar.name(nonterm).to_string(),
        });
    }
    out.descriptors
        .extend(alts.iter().map(|&rule| Descriptor::new(Slot::start(rule), pos, pos)));
    Ok(alts.len())
}

#[cfg(test)]
#[path = "tests/resume.rs"]
mod tests;
