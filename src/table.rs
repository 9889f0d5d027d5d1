//! Relation stores `G` and `P`, indexed by commencement.
//!
//! Each call `(X, l)` keeps the continuations waiting on it (`G`) and the
//! right extents it has been found to reach (`P`). Both only ever grow.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::descriptor::{Commencement, Continuation};

/// Bookkeeping for a single call.
#[derive(Debug, Clone, Default)]
pub struct CallEntry {
    /// Continuations to resume when the call completes.
    continuations: HashSet<Continuation>,
    /// Right extents reached by the call so far.
    extents: HashSet<usize>,
}

impl CallEntry {
    pub fn continuation_count(&self) -> usize {
        self.continuations.len()
    }

    pub fn extent_count(&self) -> usize {
        self.extents.len()
    }

    /// A call has completed at least once when it has an extent.
    pub fn is_completed(&self) -> bool {
        !self.extents.is_empty()
    }
}

/// Store of all calls seen during one fixpoint run.
#[derive(Debug, Default)]
pub struct CallTable {
    calls: HashMap<Commencement, CallEntry>,
    continuation_count: usize,
    extent_count: usize,
}

impl CallTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `call -> cont` in `G`.
    ///
    /// Returns true if the edge was new.
    pub fn subscribe(&mut self, call: Commencement, cont: Continuation) -> bool {
        let added = self.calls.entry(call).or_default().continuations.insert(cont);
        if added {
            self.continuation_count += 1;
        }
        added
    }

    /// Record `(call, right)` in `P`.
    ///
    /// Returns true if the extent was new.
    pub fn record_extent(&mut self, call: Commencement, right: usize) -> bool {
        let added = self.calls.entry(call).or_default().extents.insert(right);
        if added {
            self.extent_count += 1;
        }
        added
    }

    /// Continuations waiting on `call`.
    pub fn continuations(&self, call: Commencement) -> SmallVec<[Continuation; 4]> {
        self.calls
            .get(&call)
            .map(|entry| entry.continuations.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Right extents already discovered for `call`.
    pub fn extents(&self, call: Commencement) -> SmallVec<[usize; 4]> {
        self.calls
            .get(&call)
            .map(|entry| entry.extents.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn has_extent(&self, call: Commencement, right: usize) -> bool {
        self.calls
            .get(&call)
            .map_or(false, |entry| entry.extents.contains(&right))
    }

    pub fn get(&self, call: Commencement) -> Option<&CallEntry> {
        self.calls.get(&call)
    }

    /// Number of distinct calls with any bookkeeping.
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Size of `G`.
    pub fn continuation_count(&self) -> usize {
        self.continuation_count
    }

    /// Size of `P`.
    pub fn extent_count(&self) -> usize {
        self.extent_count
    }

    /// Iterator over all calls and their entries.
    pub fn iter(&self) -> impl Iterator<Item = (&Commencement, &CallEntry)> {
        self.calls.iter()
    }
}

#[cfg(test)]
#[path = "tests/table.rs"]
mod tests;
