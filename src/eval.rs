//! Transition dispatcher.
//!
//! [`step`] expands one descriptor against a read-only view of the call
//! table and reports everything it wants added as a [`Delta`]. The engine
//! owns all mutation, so a step never observes its own output.

use smallvec::SmallVec;

use crate::descriptor::{Bsr, Commencement, Continuation, Descriptor};
use crate::error::GllError;
use crate::grammar::{Grammar, NonTermId, Symbol, Terminal};
use crate::matching::match_terminal;
use crate::resume::{ascend, descend, skip};
use crate::table::CallTable;
#[cfg(feature = "tracing")]
use crate::trace::{trace, trace_span};

/// Additions produced by one step. Every field is unioned into its relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    /// Candidates for `W`.
    pub descriptors: SmallVec<[Descriptor; 4]>,
    /// New edges for `Y`.
    pub bsrs: SmallVec<[Bsr; 4]>,
    /// New `G` edges.
    pub subscriptions: SmallVec<[(Commencement, Continuation); 1]>,
    /// New `P` entries.
    pub extents: SmallVec<[(Commencement, usize); 1]>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
            && self.bsrs.is_empty()
            && self.subscriptions.is_empty()
            && self.extents.is_empty()
    }
}

/// Which handler a descriptor was routed to, and what it found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Rule complete; `resumed` continuations woke up.
    EndOfRule { resumed: usize, epsilon: bool },
    /// Terminal next.
    Terminal { matched: bool },
    /// Non-terminal next, call not yet completed: opened `alternatives` rules.
    Descend { alternatives: usize },
    /// Non-terminal next, call already completed: resumed from `P`.
    Skip { resumed: usize },
}

/// Result of expanding one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub transition: Transition,
    pub delta: Delta,
}

/// Expand `d` by routing on the symbol after its dot.
pub fn step<T: Terminal>(
    grammar: &Grammar<T>,
    input: &[T],
    calls: &CallTable,
    d: Descriptor,
) -> Result<Step, GllError> {
    #[cfg(feature = "tracing")]
    let _span = trace_span!("step", slot = ?d.slot, left = d.left, pos = d.pos).entered();

    let mut delta = Delta::new();
    let transition = match grammar.next_symbol(d.slot) {
        None => handle_end_of_rule(grammar, calls, d, &mut delta),
        Some(Symbol::Term(_)) => {
            let matched = match_terminal(grammar, input, d, &mut delta);
            #[cfg(feature = "tracing")]
            trace!(matched, "next_terminal");
            Transition::Terminal { matched }
        }
        Some(Symbol::NonTerm(nt)) => handle_nonterminal(grammar, calls, d, *nt, &mut delta)?,
    };
    Ok(Step { transition, delta })
}

/// The rule of `d.slot` derives `[d.left, d.pos)`.
fn handle_end_of_rule<T: Terminal>(
    grammar: &Grammar<T>,
    calls: &CallTable,
    d: Descriptor,
    delta: &mut Delta,
) -> Transition {
    let call = Commencement::new(grammar.lhs(d.slot), d.left);
    let waiting = calls.continuations(call);
    let resumed = ascend(d.left, &waiting, d.pos, delta);
    #[cfg(feature = "tracing")]
    if resumed > 0 {
        trace!(resumed, right = d.pos, "ascend");
    }
    delta.extents.push((call, d.pos));

    let epsilon = grammar.rule(d.slot.rule).is_empty();
    if epsilon {
        delta.bsrs.push(Bsr::new(d.slot, d.left, d.left, d.left));
    }

    #[cfg(feature = "tracing")]
    trace!(
        nonterm = grammar.name(call.nonterm),
        left = d.left,
        right = d.pos,
        resumed,
        epsilon,
        "end_of_rule"
    );
    Transition::EndOfRule { resumed, epsilon }
}

/// A non-terminal `X` follows the dot: subscribe to `(X, k)`, then either
/// reuse its known extents or open the call.
fn handle_nonterminal<T: Terminal>(
    grammar: &Grammar<T>,
    calls: &CallTable,
    d: Descriptor,
    nonterm: NonTermId,
    delta: &mut Delta,
) -> Result<Transition, GllError> {
    let call = Commencement::new(nonterm, d.pos);
    let cont = Continuation::new(d.slot.advance(), d.left);
    delta.subscriptions.push((call, cont));
    #[cfg(feature = "tracing")]
    trace!(nonterm = grammar.name(nonterm), pos = d.pos, "next_nonterminal");

    let known = calls.extents(call);
    if known.is_empty() {
        let alternatives = descend(grammar, nonterm, d.pos, delta)?;
        #[cfg(feature = "tracing")]
        trace!(nonterm = grammar.name(nonterm), pos = d.pos, alternatives, "descend");
        Ok(Transition::Descend { alternatives })
    } else {
        let resumed = skip(d.pos, cont, &known, delta);
        #[cfg(feature = "tracing")]
        trace!(nonterm = grammar.name(nonterm), pos = d.pos, resumed, "skip");
        Ok(Transition::Skip { resumed })
    }
}

#[cfg(test)]
#[path = "tests/eval.rs"]
mod tests;
