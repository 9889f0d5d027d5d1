//! Counters for a fixpoint run.
//!
//! With the `tracing` feature the engine bumps relaxed atomic counters as it
//! goes; without it every method is an empty inline function and
//! [`ParseMetrics::report`] returns an all-zero [`MetricsReport`].
//!
//! ```rust,ignore
//! use fungll::Engine;
//!
//! let fix = Engine::new(&grammar).run(&input, start)?;
//! println!("{}", fix.metrics);
//! ```

#[cfg(feature = "tracing")]
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one engine.
#[cfg(feature = "tracing")]
pub struct ParseMetrics {
    /// Descriptors taken off the worklist and expanded
    pub steps: AtomicU64,
    /// Descriptors pushed onto the worklist
    pub descriptors_queued: AtomicU64,
    /// Descriptors produced but already in `U` or pending
    pub duplicates_skipped: AtomicU64,
    pub terminal_matches: AtomicU64,
    pub terminal_mismatches: AtomicU64,
    /// First visits to a call
    pub descends: AtomicU64,
    /// Resumptions from extents already in `P`
    pub skips: AtomicU64,
    /// Resumptions of waiting continuations on completion
    pub ascends: AtomicU64,
    /// New BSRs added to `Y`
    pub bsrs_recorded: AtomicU64,
    /// Largest worklist length observed
    pub max_worklist: AtomicU64,
}

#[cfg(feature = "tracing")]
impl ParseMetrics {
    pub fn new() -> Self {
        Self {
            steps: AtomicU64::new(0),
            descriptors_queued: AtomicU64::new(0),
            duplicates_skipped: AtomicU64::new(0),
            terminal_matches: AtomicU64::new(0),
            terminal_mismatches: AtomicU64::new(0),
            descends: AtomicU64::new(0),
            skips: AtomicU64::new(0),
            ascends: AtomicU64::new(0),
            bsrs_recorded: AtomicU64::new(0),
            max_worklist: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_step(&self) {
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_queued(&self) {
        self.descriptors_queued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_terminal_match(&self) {
        self.terminal_matches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_terminal_mismatch(&self) {
        self.terminal_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_descend(&self) {
        self.descends.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skip(&self) {
        self.skips.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_ascend(&self) {
        self.ascends.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_bsr(&self) {
        self.bsrs_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Raise the worklist high-water mark if `len` exceeds it.
    #[inline]
    pub fn update_max_worklist(&self, len: u64) {
        let mut current = self.max_worklist.load(Ordering::Relaxed);
        while len > current {
            match self.max_worklist.compare_exchange_weak(
                current,
                len,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(c) => current = c,
            }
        }
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            steps: self.steps.load(Ordering::Relaxed),
            descriptors_queued: self.descriptors_queued.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            terminal_matches: self.terminal_matches.load(Ordering::Relaxed),
            terminal_mismatches: self.terminal_mismatches.load(Ordering::Relaxed),
            descends: self.descends.load(Ordering::Relaxed),
            skips: self.skips.load(Ordering::Relaxed),
            ascends: self.ascends.load(Ordering::Relaxed),
            bsrs_recorded: self.bsrs_recorded.load(Ordering::Relaxed),
            max_worklist: self.max_worklist.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.steps.store(0, Ordering::Relaxed);
        self.descriptors_queued.store(0, Ordering::Relaxed);
        self.duplicates_skipped.store(0, Ordering::Relaxed);
        self.terminal_matches.store(0, Ordering::Relaxed);
        self.terminal_mismatches.store(0, Ordering::Relaxed);
        self.descends.store(0, Ordering::Relaxed);
        self.skips.store(0, Ordering::Relaxed);
        self.ascends.store(0, Ordering::Relaxed);
        self.bsrs_recorded.store(0, Ordering::Relaxed);
        self.max_worklist.store(0, Ordering::Relaxed);
    }
}

#[cfg(feature = "tracing")]
impl Default for ParseMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsReport {
    pub steps: u64,
    pub descriptors_queued: u64,
    pub duplicates_skipped: u64,
    pub terminal_matches: u64,
    pub terminal_mismatches: u64,
    pub descends: u64,
    pub skips: u64,
    pub ascends: u64,
    pub bsrs_recorded: u64,
    pub max_worklist: u64,
}

impl MetricsReport {
    /// Fraction of terminal tests that matched. 1.0 when none were made.
    pub fn match_rate(&self) -> f64 {
        let total = self.terminal_matches + self.terminal_mismatches;
        if total == 0 {
            1.0
        } else {
            self.terminal_matches as f64 / total as f64
        }
    }

    /// Share of calls that were resumed from `P` rather than descended.
    pub fn reuse_rate(&self) -> f64 {
        let total = self.descends + self.skips;
        if total == 0 {
            0.0
        } else {
            self.skips as f64 / total as f64
        }
    }
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Parse Metrics ===")?;
        writeln!(f, "Steps:              {}", self.steps)?;
        writeln!(
            f,
            "Descriptors:        {} queued, {} duplicates skipped",
            self.descriptors_queued, self.duplicates_skipped
        )?;
        writeln!(
            f,
            "Terminals:          {} matched, {} mismatched ({:.1}% match)",
            self.terminal_matches,
            self.terminal_mismatches,
            self.match_rate() * 100.0
        )?;
        writeln!(
            f,
            "Calls:              {} descends, {} skips, {} ascends",
            self.descends, self.skips, self.ascends
        )?;
        writeln!(f, "BSRs recorded:      {}", self.bsrs_recorded)?;
        writeln!(f, "Max worklist:       {}", self.max_worklist)?;
        Ok(())
    }
}

#[cfg(not(feature = "tracing"))]
pub struct ParseMetrics;

#[cfg(not(feature = "tracing"))]
impl ParseMetrics {
    #[inline]
    pub fn new() -> Self {
        ParseMetrics
    }
    #[inline]
    pub fn record_step(&self) {}
    #[inline]
    pub fn record_queued(&self) {}
    #[inline]
    pub fn record_duplicate(&self) {}
    #[inline]
    pub fn record_terminal_match(&self) {}
    #[inline]
    pub fn record_terminal_mismatch(&self) {}
    #[inline]
    pub fn record_descend(&self) {}
    #[inline]
    pub fn record_skip(&self) {}
    #[inline]
    pub fn record_ascend(&self) {}
    #[inline]
    pub fn record_bsr(&self) {}
    #[inline]
    pub fn update_max_worklist(&self, _len: u64) {}
    #[inline]
    pub fn report(&self) -> MetricsReport {
        MetricsReport::default()
    }
    #[inline]
    pub fn reset(&self) {}
}

#[cfg(not(feature = "tracing"))]
impl Default for ParseMetrics {
    fn default() -> Self {
        Self::new()
    }
}
