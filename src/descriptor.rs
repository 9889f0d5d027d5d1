//! Value records for the descriptor algebra.
//!
//! All four records are small `Copy` types with structural equality and
//! hashing; they are used directly as keys of the relation stores.

use crate::grammar::{NonTermId, Slot};

/// A unit of pending work: derivation via `slot`, started at `left`,
/// has consumed input up to `pos`.
///
/// Invariant: `left <= pos <= n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Descriptor {
    pub slot: Slot,
    pub left: usize,
    pub pos: usize,
}

impl Descriptor {
    pub fn new(slot: Slot, left: usize, pos: usize) -> Self {
        debug_assert!(left <= pos, "descriptor left extent {} past position {}", left, pos);
        Self { slot, left, pos }
    }
}

/// A distinct call: derive `nonterm` starting at `left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Commencement {
    pub nonterm: NonTermId,
    pub left: usize,
}

impl Commencement {
    pub fn new(nonterm: NonTermId, left: usize) -> Self {
        Self { nonterm, left }
    }
}

/// A suspended resumption point, waiting on a call to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Continuation {
    pub slot: Slot,
    pub left: usize,
}

impl Continuation {
    pub fn new(slot: Slot, left: usize) -> Self {
        Self { slot, left }
    }
}

/// Binary Subtree Representation edge: the rule prefix up to `slot` derives
/// `[left, right)`, with the last consumed symbol covering `[split, right)`.
///
/// Invariant: `left <= split <= right <= n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bsr {
    pub slot: Slot,
    pub left: usize,
    pub split: usize,
    pub right: usize,
}

impl Bsr {
    pub fn new(slot: Slot, left: usize, split: usize, right: usize) -> Self {
        Self {
            slot,
            left,
            split,
            right,
        }
    }

    /// Whether `0 <= left <= split <= right <= n` holds.
    pub fn is_well_formed(&self, n: usize) -> bool {
        self.left <= self.split && self.split <= self.right && self.right <= n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_hash_structurally() {
        use hashbrown::HashSet;
        let slot = Slot::start(3);
        let mut set = HashSet::new();
        assert!(set.insert(Descriptor::new(slot, 0, 1)));
        assert!(!set.insert(Descriptor::new(Slot { rule: 3, dot: 0 }, 0, 1)));
        assert!(set.insert(Descriptor::new(slot.advance(), 0, 1)));
    }

    #[test]
    fn bsr_well_formedness() {
        let slot = Slot::start(0);
        assert!(Bsr::new(slot, 0, 0, 0).is_well_formed(0));
        assert!(Bsr::new(slot, 1, 2, 3).is_well_formed(3));
        assert!(!Bsr::new(slot, 2, 1, 3).is_well_formed(3));
        assert!(!Bsr::new(slot, 0, 1, 4).is_well_formed(3));
    }
}
