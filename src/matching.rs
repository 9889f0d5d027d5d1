//! Terminal matcher.

use crate::descriptor::{Bsr, Descriptor};
use crate::eval::Delta;
use crate::grammar::{Grammar, Symbol, Terminal};

/// Try to consume the terminal after the dot of `d` at `input[d.pos]`.
///
/// On a match, pushes the advanced descriptor `(g+1, l, k+1)` and the BSR
/// `(g+1, l, k, k+1)` into `out` and returns true. A mismatch or the end of
/// the input produces nothing.
///
/// Panics if the slot's next symbol is not a terminal.
pub fn match_terminal<T: Terminal>(
    grammar: &Grammar<T>,
    input: &[T],
    d: Descriptor,
    out: &mut Delta,
) -> bool {
    let expected = match grammar.next_symbol(d.slot) {
        Some(Symbol::Term(t)) => t,
        other => panic!(
            "terminal matcher invoked on slot {} with next symbol {:?}",
            grammar.display_slot(d.slot),
            other
        ),
    };

    match input.get(d.pos) {
        Some(actual) if actual == expected => {
            let next = d.slot.advance();
            out.descriptors.push(Descriptor::new(next, d.left, d.pos + 1));
            out.bsrs.push(Bsr::new(next, d.left, d.pos, d.pos + 1));
            true
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/matching.rs"]
mod tests;
