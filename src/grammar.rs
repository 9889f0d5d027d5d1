//! Grammar model consumed by the fixpoint engine.
//!
//! Non-terminals and rules are interned to small integer handles once per
//! grammar. A [`Slot`] is a dotted position inside a rule; it is a plain
//! `(rule, dot)` pair, so slots compare and hash structurally and two slots
//! of different alternatives of the same non-terminal are always distinct.

use crate::symbol::{NameId, SymbolStore};
use hashbrown::HashMap;
use smallvec::SmallVec;
use std::fmt;
use std::hash::Hash;

/// Handle for a non-terminal within its grammar.
pub type NonTermId = u32;

/// Handle for one alternative (right-hand side) of a non-terminal.
pub type RuleId = u32;

/// Requirements on terminal values: equality and hashing, plus Debug for display.
pub trait Terminal: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Terminal for T {}

/// A right-hand side symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol<T> {
    /// Matches exactly one input element equal to the value.
    Term(T),
    /// Derivation of another non-terminal.
    NonTerm(NonTermId),
}

impl<T> Symbol<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Term(_))
    }
}

/// A dotted rule position: `dot` symbols of `rule` have been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub rule: RuleId,
    pub dot: u32,
}

impl Slot {
    /// The slot at the start of a rule.
    pub fn start(rule: RuleId) -> Self {
        Self { rule, dot: 0 }
    }

    /// The slot one symbol further along the same rule.
    pub fn advance(self) -> Self {
        Self {
            rule: self.rule,
            dot: self.dot + 1,
        }
    }
}

/// One alternative of a non-terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule<T> {
    pub lhs: NonTermId,
    pub rhs: SmallVec<[Symbol<T>; 4]>,
}

impl<T> Rule<T> {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    /// An epsilon alternative.
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

/// A context-free grammar over terminals of type `T`.
pub struct Grammar<T> {
    names: SymbolStore,
    nonterms: Vec<NameId>,
    index: HashMap<NameId, NonTermId>,
    rules: Vec<Rule<T>>,
    alternatives: Vec<SmallVec<[RuleId; 4]>>,
}

impl<T: Terminal> Grammar<T> {
    /// Create an empty grammar.
    pub fn new() -> Self {
        Self {
            names: SymbolStore::new(),
            nonterms: Vec::new(),
            index: HashMap::new(),
            rules: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    /// Get or create the non-terminal with the given name.
    pub fn nonterminal(&mut self, name: &str) -> NonTermId {
        let key = self.names.intern(name);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.nonterms.len() as NonTermId;
        self.nonterms.push(key);
        self.alternatives.push(SmallVec::new());
        self.index.insert(key, id);
        id
    }

    /// Look up a non-terminal by name without creating it.
    pub fn lookup(&self, name: &str) -> Option<NonTermId> {
        let key = self.names.get(name)?;
        self.index.get(&key).copied()
    }

    /// Name of a non-terminal.
    ///
    /// Panics if `id` does not belong to this grammar.
    pub fn name(&self, id: NonTermId) -> &str {
        let key = self.nonterms[id as usize];
        self.names.resolve(key).unwrap_or("<unknown>")
    }

    /// Add an alternative `lhs ::= rhs`. An empty `rhs` is an epsilon rule.
    pub fn add_rule(&mut self, lhs: NonTermId, rhs: impl IntoIterator<Item = Symbol<T>>) -> RuleId {
        assert!(
            (lhs as usize) < self.nonterms.len(),
            "left-hand side {} is not a non-terminal of this grammar",
            lhs
        );
        let rhs: SmallVec<[Symbol<T>; 4]> = rhs.into_iter().collect();
        for sym in &rhs {
            if let Symbol::NonTerm(nt) = sym {
                assert!(
                    (*nt as usize) < self.nonterms.len(),
                    "right-hand side references foreign non-terminal {}",
                    nt
                );
            }
        }
        let id = self.rules.len() as RuleId;
        self.rules.push(Rule { lhs, rhs });
        self.alternatives[lhs as usize].push(id);
        id
    }

    /// Get a rule by its ID.
    pub fn rule(&self, id: RuleId) -> &Rule<T> {
        &self.rules[id as usize]
    }

    /// All rules, in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule<T>)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, r)| (i as RuleId, r))
    }

    /// Alternatives of a non-terminal. Empty for a referenced-but-undefined one.
    pub fn alternatives(&self, nt: NonTermId) -> &[RuleId] {
        self.alternatives
            .get(nt as usize)
            .map(|alts| alts.as_slice())
            .unwrap_or(&[])
    }

    pub fn nonterm_count(&self) -> usize {
        self.nonterms.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Number of distinct slots: one per dot position of every rule.
    pub fn slot_count(&self) -> usize {
        self.rules.iter().map(|r| r.len() + 1).sum()
    }

    /// Owning non-terminal of a slot.
    pub fn lhs(&self, slot: Slot) -> NonTermId {
        self.rule(slot.rule).lhs
    }

    /// The symbol right after the dot, or None at the end of the rule.
    pub fn next_symbol(&self, slot: Slot) -> Option<&Symbol<T>> {
        self.rule(slot.rule).rhs.get(slot.dot as usize)
    }

    /// The unconsumed suffix of the slot's rule.
    pub fn remaining(&self, slot: Slot) -> &[Symbol<T>] {
        let rhs = &self.rule(slot.rule).rhs;
        &rhs[(slot.dot as usize).min(rhs.len())..]
    }

    /// Whether the dot is at the end of its rule.
    pub fn is_complete(&self, slot: Slot) -> bool {
        slot.dot as usize >= self.rule(slot.rule).len()
    }

    /// Non-terminals that are referenced or declared but have no alternatives.
    pub fn undefined_nonterms(&self) -> Vec<NonTermId> {
        (0..self.nonterms.len() as NonTermId)
            .filter(|&nt| self.alternatives(nt).is_empty())
            .collect()
    }

    /// Display adapter for a slot, e.g. `S ::= 'a' • S`.
    pub fn display_slot(&self, slot: Slot) -> SlotDisplay<'_, T> {
        SlotDisplay {
            grammar: self,
            slot,
            dotted: true,
        }
    }

    /// Display adapter for a whole rule, e.g. `S ::= 'a' S`.
    pub fn display_rule(&self, rule: RuleId) -> SlotDisplay<'_, T> {
        SlotDisplay {
            grammar: self,
            slot: Slot::start(rule),
            dotted: false,
        }
    }

    pub(crate) fn fmt_symbol(&self, sym: &Symbol<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match sym {
            Symbol::Term(t) => write!(f, "{:?}", t),
            Symbol::NonTerm(nt) => write!(f, "{}", self.name(*nt)),
        }
    }
}

impl<T: Terminal> Default for Grammar<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Terminal> fmt::Debug for Grammar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("nonterms", &self.nonterms.len())
            .field("rules", &self.rules)
            .finish()
    }
}

impl<T: Terminal> fmt::Display for Grammar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for nt in 0..self.nonterms.len() as NonTermId {
            let alts = self.alternatives(nt);
            if alts.is_empty() {
                continue;
            }
            write!(f, "{} ::=", self.name(nt))?;
            for (i, &rule) in alts.iter().enumerate() {
                if i > 0 {
                    write!(f, " |")?;
                }
                let rhs = &self.rule(rule).rhs;
                if rhs.is_empty() {
                    write!(f, " ε")?;
                }
                for sym in rhs {
                    write!(f, " ")?;
                    self.fmt_symbol(sym, f)?;
                }
            }
            writeln!(f, " ;")?;
        }
        Ok(())
    }
}

/// Formats a slot or rule against its grammar.
pub struct SlotDisplay<'g, T> {
    grammar: &'g Grammar<T>,
    slot: Slot,
    dotted: bool,
}

impl<T: Terminal> fmt::Display for SlotDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = self.grammar.rule(self.slot.rule);
        write!(f, "{} ::=", self.grammar.name(rule.lhs))?;
        if !self.dotted && rule.is_empty() {
            return write!(f, " ε");
        }
        for (i, sym) in rule.rhs.iter().enumerate() {
            if self.dotted && i == self.slot.dot as usize {
                write!(f, " •")?;
            }
            write!(f, " ")?;
            self.grammar.fmt_symbol(sym, f)?;
        }
        if self.dotted && self.slot.dot as usize >= rule.len() {
            write!(f, " •")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/grammar.rs"]
mod tests;
