//! Engine - worklist loop that drives descriptors to a fixpoint.
//!
//! A run owns five growing sets: the worklist `W`, the visited set `U`, the
//! call table (`G` and `P`), and the forest `Y`. Each iteration pops one
//! descriptor, expands it with [`crate::eval::step`], and unions the result
//! back in. Nothing is ever removed except from `W`, so the final sets do
//! not depend on the order in which `W` is drained.

use hashbrown::HashSet;
use std::collections::VecDeque;

use crate::descriptor::{Bsr, Descriptor};
use crate::error::GllError;
use crate::eval::{self, Delta, Transition};
use crate::forest::Forest;
use crate::grammar::{Grammar, NonTermId, Terminal};
use crate::metrics::{MetricsReport, ParseMetrics};
use crate::resume::descend;
use crate::table::CallTable;
#[cfg(feature = "tracing")]
use crate::trace::{debug, debug_span};

/// Order in which pending descriptors are taken off the worklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorklistOrder {
    /// Oldest first.
    #[default]
    Fifo,
    /// Newest first.
    Lifo,
}

/// Tuning knobs for a run. None of them change the final forest of a
/// completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Abort with [`GllError::StepLimitExceeded`] after this many expansions.
    pub max_steps: Option<usize>,
    pub order: WorklistOrder,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_order(mut self, order: WorklistOrder) -> Self {
        self.order = order;
        self
    }
}

/// Final state of a run.
#[derive(Debug)]
pub struct Fixpoint {
    /// `U`: every descriptor that was expanded.
    pub visited: HashSet<Descriptor>,
    /// `Y`.
    pub forest: Forest,
    /// `G` and `P`. Internal to a run; callers see only `U` and `Y`.
    pub(crate) calls: CallTable,
    /// Full-span BSRs of the start symbol. Empty for runs seeded by hand.
    pub roots: Vec<Bsr>,
    pub input_len: usize,
    pub steps: usize,
    pub metrics: MetricsReport,
}

impl Fixpoint {
    /// Whether the start symbol derives the whole input.
    pub fn accepted(&self) -> bool {
        !self.roots.is_empty()
    }
}

/// Pending descriptors plus a membership set so each one is queued once.
struct Worklist {
    queue: VecDeque<Descriptor>,
    pending: HashSet<Descriptor>,
    order: WorklistOrder,
}

impl Worklist {
    fn new(order: WorklistOrder) -> Self {
        Self {
            queue: VecDeque::new(),
            pending: HashSet::new(),
            order,
        }
    }

    fn push(&mut self, d: Descriptor) -> bool {
        if self.pending.insert(d) {
            self.queue.push_back(d);
            true
        } else {
            false
        }
    }

    fn pop(&mut self) -> Option<Descriptor> {
        let d = match self.order {
            WorklistOrder::Fifo => self.queue.pop_front(),
            WorklistOrder::Lifo => self.queue.pop_back(),
        }?;
        self.pending.remove(&d);
        Some(d)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Fixpoint engine bound to a grammar.
pub struct Engine<'g, T> {
    grammar: &'g Grammar<T>,
    config: EngineConfig,
    metrics: ParseMetrics,
}

impl<'g, T: Terminal> Engine<'g, T> {
    pub fn new(grammar: &'g Grammar<T>) -> Self {
        Self::with_config(grammar, EngineConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar<T>, config: EngineConfig) -> Self {
        Self {
            grammar,
            config,
            metrics: ParseMetrics::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grammar(&self) -> &'g Grammar<T> {
        self.grammar
    }

    /// Parse `input` from `start`: seed every alternative of `start` at 0,
    /// run to the fixpoint and collect the accepting roots.
    pub fn run(&self, input: &[T], start: NonTermId) -> Result<Fixpoint, GllError> {
        let mut seeds = Delta::new();
        descend(self.grammar, start, 0, &mut seeds)?;
        let mut fix = self.run_from(input, seeds.descriptors)?;
        fix.roots = fix.forest.roots(self.grammar, start, input.len());
        Ok(fix)
    }

    /// Run to the fixpoint from an arbitrary initial worklist.
    pub fn run_from(
        &self,
        input: &[T],
        initial: impl IntoIterator<Item = Descriptor>,
    ) -> Result<Fixpoint, GllError> {
        let n = input.len();
        #[cfg(feature = "tracing")]
        let _span = debug_span!("fixpoint", input_len = n).entered();

        self.metrics.reset();
        let mut worklist = Worklist::new(self.config.order);
        let mut visited: HashSet<Descriptor> = HashSet::new();
        let mut calls = CallTable::new();
        let mut forest = Forest::new();
        let mut steps = 0usize;

        for d in initial {
            assert!(
                d.left <= d.pos && d.pos <= n,
                "initial descriptor {:?} outside input of length {}",
                d,
                n
            );
            if worklist.push(d) {
                self.metrics.record_queued();
            }
        }

        while let Some(d) = worklist.pop() {
            if let Some(max) = self.config.max_steps {
                if steps >= max {
                    #[cfg(feature = "tracing")]
                    debug!(steps, pending = worklist.len() + 1, "step limit reached");
                    return Err(GllError::StepLimitExceeded { steps });
                }
            }
            if !visited.insert(d) {
                self.metrics.record_duplicate();
                continue;
            }
            steps += 1;
            self.metrics.record_step();

            let step = eval::step(self.grammar, input, &calls, d)?;
            self.record_transition(step.transition);

            let delta = step.delta;
            for (call, cont) in delta.subscriptions {
                calls.subscribe(call, cont);
            }
            for (call, right) in delta.extents {
                calls.record_extent(call, right);
            }
            for bsr in delta.bsrs {
                if forest.insert(bsr) {
                    self.metrics.record_bsr();
                }
            }
            for next in delta.descriptors {
                if visited.contains(&next) || !worklist.push(next) {
                    self.metrics.record_duplicate();
                } else {
                    self.metrics.record_queued();
                }
            }
            self.metrics.update_max_worklist(worklist.len() as u64);
        }
        debug_assert!(worklist.is_empty());

        #[cfg(feature = "tracing")]
        debug!(
            steps,
            visited = visited.len(),
            bsrs = forest.len(),
            calls = calls.call_count(),
            continuations = calls.continuation_count(),
            extents = calls.extent_count(),
            "fixpoint reached"
        );

        Ok(Fixpoint {
            visited,
            forest,
            calls,
            roots: Vec::new(),
            input_len: n,
            steps,
            metrics: self.metrics.report(),
        })
    }

    fn record_transition(&self, transition: Transition) {
        match transition {
            Transition::EndOfRule { resumed, .. } => {
                for _ in 0..resumed {
                    self.metrics.record_ascend();
                }
            }
            Transition::Terminal { matched: true } => self.metrics.record_terminal_match(),
            Transition::Terminal { matched: false } => self.metrics.record_terminal_mismatch(),
            Transition::Descend { .. } => self.metrics.record_descend(),
            Transition::Skip { .. } => self.metrics.record_skip(),
        }
    }
}

/// A parser for one grammar and start symbol, reusable across inputs.
pub struct Parser<'g, T> {
    grammar: &'g Grammar<T>,
    start: NonTermId,
    config: EngineConfig,
}

impl<'g, T: Terminal> Parser<'g, T> {
    pub fn new(grammar: &'g Grammar<T>, start: NonTermId) -> Self {
        Self {
            grammar,
            start,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn start(&self) -> NonTermId {
        self.start
    }

    /// Run the engine and keep every relation.
    pub fn run(&self, input: &[T]) -> Result<Fixpoint, GllError> {
        Engine::with_config(self.grammar, self.config.clone()).run(input, self.start)
    }

    /// The BSR forest for `input`.
    pub fn parse(&self, input: &[T]) -> Result<Forest, GllError> {
        self.run(input).map(|fix| fix.forest)
    }

    /// Whether `input` derives from the start symbol.
    pub fn recognize(&self, input: &[T]) -> Result<bool, GllError> {
        self.run(input).map(|fix| fix.accepted())
    }
}

/// Run the engine with the default configuration.
pub fn fungll<T: Terminal>(
    grammar: &Grammar<T>,
    input: &[T],
    start: NonTermId,
) -> Result<Fixpoint, GllError> {
    Engine::new(grammar).run(input, start)
}

/// Parse `input` and return only the BSR forest.
pub fn parse<T: Terminal>(
    grammar: &Grammar<T>,
    input: &[T],
    start: NonTermId,
) -> Result<Forest, GllError> {
    Parser::new(grammar, start).parse(input)
}

/// Whether `input` derives from `start`.
pub fn recognize<T: Terminal>(
    grammar: &Grammar<T>,
    input: &[T],
    start: NonTermId,
) -> Result<bool, GllError> {
    Parser::new(grammar, start).recognize(input)
}

#[cfg(test)]
#[path = "tests/engine.rs"]
mod tests;
