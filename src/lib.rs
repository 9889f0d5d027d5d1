//! Generalized LL parsing as a worklist fixpoint.
//!
//! A parse expands descriptors until no new ones appear, growing four
//! relations along the way: the continuations waiting on each call (`G`),
//! the right extents each call reaches (`P`), the expanded descriptors (`U`)
//! and the binary subtree representation of the parse forest (`Y`). Left
//! recursion, cycles and ambiguity need no special handling.
//!
//! ```rust,ignore
//! use fungll::{fungll, Grammar, Symbol};
//!
//! let mut g = Grammar::new();
//! let p = g.nonterminal("P");
//! g.add_rule(p, [Symbol::Term('('), Symbol::NonTerm(p), Symbol::Term(')'), Symbol::NonTerm(p)]);
//! g.add_rule(p, []);
//!
//! let input: Vec<char> = "()()".chars().collect();
//! let fix = fungll(&g, &input, p)?;
//! assert!(fix.accepted());
//! ```

pub mod cli;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod eval;
pub mod forest;
pub mod grammar;
pub mod matching;
pub mod metrics;
pub mod resume;
pub mod sppf;
pub mod symbol;
pub mod table;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_utils;

pub use descriptor::{Bsr, Commencement, Continuation, Descriptor};
pub use engine::{fungll, parse, recognize, Engine, EngineConfig, Fixpoint, Parser, WorklistOrder};
pub use error::{GllError, InvariantViolation};
pub use forest::Forest;
pub use grammar::{Grammar, NonTermId, Rule, RuleId, Slot, Symbol, Terminal};
pub use sppf::Sppf;
