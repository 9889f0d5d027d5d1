//! The BSR set `Y` produced by a fixpoint run.

use hashbrown::HashSet;
use std::fmt;

use crate::descriptor::Bsr;
use crate::error::InvariantViolation;
use crate::grammar::{Grammar, NonTermId, Terminal};

/// A set of BSR edges. Order of iteration carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    bsrs: HashSet<Bsr>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a BSR. Returns true if it was new.
    pub fn insert(&mut self, bsr: Bsr) -> bool {
        self.bsrs.insert(bsr)
    }

    pub fn contains(&self, bsr: &Bsr) -> bool {
        self.bsrs.contains(bsr)
    }

    pub fn len(&self) -> usize {
        self.bsrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bsrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bsr> {
        self.bsrs.iter()
    }

    /// All BSRs in a stable order (by slot, then extents).
    pub fn sorted(&self) -> Vec<Bsr> {
        let mut out: Vec<Bsr> = self.bsrs.iter().copied().collect();
        out.sort();
        out
    }

    /// Accepting roots: BSRs `(g, 0, k, n)` whose slot is at the end of a
    /// rule of `start`.
    pub fn roots<T: Terminal>(&self, grammar: &Grammar<T>, start: NonTermId, n: usize) -> Vec<Bsr> {
        let mut roots: Vec<Bsr> = self
            .bsrs
            .iter()
            .filter(|b| {
                b.left == 0
                    && b.right == n
                    && grammar.lhs(b.slot) == start
                    && grammar.is_complete(b.slot)
            })
            .copied()
            .collect();
        roots.sort();
        roots
    }

    /// Whether the whole input of length `n` derives from `start`.
    pub fn is_accepted<T: Terminal>(&self, grammar: &Grammar<T>, start: NonTermId, n: usize) -> bool {
        self.bsrs.iter().any(|b| {
            b.left == 0 && b.right == n && grammar.lhs(b.slot) == start && grammar.is_complete(b.slot)
        })
    }

    /// Check `0 <= left <= split <= right <= n` for every BSR.
    pub fn check_invariants(&self, n: usize) -> Result<(), InvariantViolation> {
        let mut bad: Vec<Bsr> = self
            .bsrs
            .iter()
            .filter(|b| !b.is_well_formed(n))
            .copied()
            .collect();
        if bad.is_empty() {
            Ok(())
        } else {
            bad.sort();
            Err(InvariantViolation { n, bad })
        }
    }

    /// Display adapter listing every BSR against its grammar.
    pub fn display<'a, T: Terminal>(&'a self, grammar: &'a Grammar<T>) -> ForestDisplay<'a, T> {
        ForestDisplay {
            grammar,
            bsrs: self.sorted(),
        }
    }

    /// Display adapter for an arbitrary selection, such as the roots.
    pub fn display_bsrs<'a, T: Terminal>(grammar: &'a Grammar<T>, bsrs: &[Bsr]) -> ForestDisplay<'a, T> {
        ForestDisplay {
            grammar,
            bsrs: bsrs.to_vec(),
        }
    }
}

impl Extend<Bsr> for Forest {
    fn extend<I: IntoIterator<Item = Bsr>>(&mut self, iter: I) {
        self.bsrs.extend(iter)
    }
}

impl FromIterator<Bsr> for Forest {
    fn from_iter<I: IntoIterator<Item = Bsr>>(iter: I) -> Self {
        Self {
            bsrs: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Forest {
    type Item = Bsr;
    type IntoIter = hashbrown::hash_set::IntoIter<Bsr>;

    fn into_iter(self) -> Self::IntoIter {
        self.bsrs.into_iter()
    }
}

/// Formats BSRs as `{ (slot, l, k, r) ... }`, one per line.
pub struct ForestDisplay<'a, T> {
    grammar: &'a Grammar<T>,
    bsrs: Vec<Bsr>,
}

impl<T: Terminal> fmt::Display for ForestDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for b in &self.bsrs {
            writeln!(
                f,
                "    ({}, {}, {}, {})",
                self.grammar.display_slot(b.slot),
                b.left,
                b.split,
                b.right
            )?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
#[path = "tests/forest.rs"]
mod tests;
