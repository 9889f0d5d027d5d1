//! Error types for the parsing engine.
//!
//! Parse rejection is not an error: an input the grammar cannot derive
//! yields a forest without a full-span root.

use crate::descriptor::Bsr;

/// Conditions that abort a fixpoint run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GllError {
    /// A non-terminal without alternatives was descended into.
    #[error("undefined non-terminal `{name}`")]
    UndefinedNonTerminal { name: String },

    /// The configured step bound was reached before the worklist emptied.
    /// The outcome of the parse is unknown, not rejected.
    #[error("step limit reached after {steps} steps; parse outcome unknown")]
    StepLimitExceeded { steps: usize },
}

/// BSRs that break `0 <= left <= split <= right <= n`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} malformed BSR(s) for input length {n}", .bad.len())]
pub struct InvariantViolation {
    pub n: usize,
    pub bad: Vec<Bsr>,
}
