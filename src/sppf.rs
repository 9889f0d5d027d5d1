//! Shared packed parse forest built from a BSR set.
//!
//! A BSR `(g, l, k, r)` with the dot of `g` at `j` says the first `j`
//! symbols of `g`'s rule derive `[l, r)`, with symbol `j-1` covering
//! `[k, r)`. Unfolding that gives the usual SPPF shape:
//!
//! * symbol nodes `(X, l, r)` pack one alternative per complete BSR of `X`;
//! * intermediate nodes `(g, l, r)` stand for a rule prefix of length >= 2;
//! * terminal leaves cover one input element, epsilon leaves none.
//!
//! Nodes are hash-consed, so cycles in the grammar (`E ::= E E E | ε`)
//! become cycles in the node graph rather than infinite unfoldings.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::fmt::Write as _;

use crate::forest::Forest;
use crate::grammar::{Grammar, NonTermId, Slot, Symbol, Terminal};

pub type NodeId = usize;

/// Identity of a node; two nodes with the same key are the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Symbol { nonterm: NonTermId, left: usize, right: usize },
    Intermediate { slot: Slot, left: usize, right: usize },
    Terminal { left: usize },
    Epsilon { at: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind<T> {
    Symbol { nonterm: NonTermId, left: usize, right: usize },
    Intermediate { slot: Slot, left: usize, right: usize },
    /// Covers `[left, left + 1)`.
    Terminal { value: T, left: usize },
    Epsilon { at: usize },
}

/// One way of deriving a node: a slot and split point, with at most two
/// children (prefix, last symbol).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    pub slot: Slot,
    pub split: usize,
    pub children: SmallVec<[NodeId; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub kind: NodeKind<T>,
    pub packed: Vec<Packed>,
}

impl<T> Node<T> {
    /// More than one packed alternative.
    pub fn is_ambiguous(&self) -> bool {
        self.packed.len() > 1
    }
}

/// A forest rooted at `(start, 0, n)`.
#[derive(Debug, Clone)]
pub struct Sppf<T> {
    nodes: Vec<Node<T>>,
    index: HashMap<NodeKey, NodeId>,
    root: Option<NodeId>,
}

/// Lookup tables over `Y` used during unfolding.
struct BsrIndex {
    /// `(X, l, r)` to the complete slots of `X` and their splits.
    completions: HashMap<(NonTermId, usize, usize), SmallVec<[(Slot, usize); 2]>>,
    /// `(g, l, r)` to the splits recorded for that prefix.
    splits: HashMap<(Slot, usize, usize), SmallVec<[usize; 2]>>,
}

impl BsrIndex {
    fn build<T: Terminal>(grammar: &Grammar<T>, forest: &Forest) -> Self {
        let mut completions: HashMap<_, SmallVec<[(Slot, usize); 2]>> = HashMap::new();
        let mut splits: HashMap<_, SmallVec<[usize; 2]>> = HashMap::new();
        for b in forest.sorted() {
            if grammar.is_complete(b.slot) {
                completions
                    .entry((grammar.lhs(b.slot), b.left, b.right))
                    .or_default()
                    .push((b.slot, b.split));
            }
            splits
                .entry((b.slot, b.left, b.right))
                .or_default()
                .push(b.split);
        }
        Self { completions, splits }
    }
}

impl<T: Terminal> Sppf<T> {
    /// Unfold `forest` from the symbol node `(start, 0, n)`.
    ///
    /// The result has no root when the forest holds no full-span derivation.
    pub fn from_forest(grammar: &Grammar<T>, forest: &Forest, start: NonTermId, n: usize) -> Self {
        let mut sppf = Sppf {
            nodes: Vec::new(),
            index: HashMap::new(),
            root: None,
        };
        if !forest.is_accepted(grammar, start, n) {
            return sppf;
        }

        let bsrs = BsrIndex::build(grammar, forest);
        let mut pending: Vec<NodeId> = Vec::new();
        let root = sppf.intern(
            NodeKind::Symbol {
                nonterm: start,
                left: 0,
                right: n,
            },
            &mut pending,
        );
        sppf.root = Some(root);

        while let Some(id) = pending.pop() {
            let packed = match sppf.nodes[id].kind {
                NodeKind::Symbol {
                    nonterm,
                    left,
                    right,
                } => bsrs
                    .completions
                    .get(&(nonterm, left, right))
                    .map(|alts| alts.to_vec())
                    .unwrap_or_default(),
                NodeKind::Intermediate { slot, left, right } => bsrs
                    .splits
                    .get(&(slot, left, right))
                    .map(|ks| ks.iter().map(|&k| (slot, k)).collect())
                    .unwrap_or_default(),
                NodeKind::Terminal { .. } | NodeKind::Epsilon { .. } => Vec::new(),
            };
            let (left, right) = match sppf.nodes[id].kind {
                NodeKind::Symbol { left, right, .. } | NodeKind::Intermediate { left, right, .. } => {
                    (left, right)
                }
                _ => continue,
            };
            for (slot, split) in packed {
                let children = sppf.children(grammar, slot, left, split, right, &mut pending);
                sppf.nodes[id].packed.push(Packed {
                    slot,
                    split,
                    children,
                });
            }
        }
        sppf
    }

    /// Children of the packed node `(slot, split)` under a node over `[left, right)`.
    fn children(
        &mut self,
        grammar: &Grammar<T>,
        slot: Slot,
        left: usize,
        split: usize,
        right: usize,
        pending: &mut Vec<NodeId>,
    ) -> SmallVec<[NodeId; 2]> {
        let mut children = SmallVec::new();
        let rhs = &grammar.rule(slot.rule).rhs;
        let dot = slot.dot as usize;
        if dot == 0 {
            children.push(self.intern(NodeKind::Epsilon { at: left }, pending));
            return children;
        }
        match dot {
            1 => {}
            2 => children.push(self.symbol_node(&rhs[0], left, split, pending)),
            _ => children.push(self.intern(
                NodeKind::Intermediate {
                    slot: Slot {
                        rule: slot.rule,
                        dot: slot.dot - 1,
                    },
                    left,
                    right: split,
                },
                pending,
            )),
        }
        children.push(self.symbol_node(&rhs[dot - 1], split, right, pending));
        children
    }

    fn symbol_node(&mut self, sym: &Symbol<T>, left: usize, right: usize, pending: &mut Vec<NodeId>) -> NodeId {
        match sym {
            Symbol::Term(value) => self.intern(
                NodeKind::Terminal {
                    value: value.clone(),
                    left,
                },
                pending,
            ),
            Symbol::NonTerm(nonterm) => self.intern(
                NodeKind::Symbol {
                    nonterm: *nonterm,
                    left,
                    right,
                },
                pending,
            ),
        }
    }

    /// Get or create a node; new nodes are queued for expansion.
    fn intern(&mut self, kind: NodeKind<T>, pending: &mut Vec<NodeId>) -> NodeId {
        let key = match &kind {
            NodeKind::Symbol {
                nonterm,
                left,
                right,
            } => NodeKey::Symbol {
                nonterm: *nonterm,
                left: *left,
                right: *right,
            },
            NodeKind::Intermediate { slot, left, right } => NodeKey::Intermediate {
                slot: *slot,
                left: *left,
                right: *right,
            },
            NodeKind::Terminal { left, .. } => NodeKey::Terminal { left: *left },
            NodeKind::Epsilon { at } => NodeKey::Epsilon { at: *at },
        };
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            packed: Vec::new(),
        });
        self.index.insert(key, id);
        pending.push(id);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id]
    }

    pub fn lookup(&self, key: NodeKey) -> Option<NodeId> {
        self.index.get(&key).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<T>)> {
        self.nodes.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether any node has more than one derivation.
    pub fn is_ambiguous(&self) -> bool {
        self.nodes.iter().any(Node::is_ambiguous)
    }

    fn child_ids(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id].packed.iter().flat_map(|p| p.children.iter().copied())
    }

    /// Number of distinct derivation trees below the root.
    ///
    /// `None` when the root reaches a cycle, i.e. there are infinitely many.
    /// `Some(0)` when there is no root. Counts saturate at `u128::MAX`.
    pub fn count_trees(&self) -> Option<u128> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let Some(root) = self.root else {
            return Some(0);
        };
        let mut mark = vec![Mark::New; self.nodes.len()];
        let mut counts = vec![0u128; self.nodes.len()];
        let mut stack = vec![(root, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                counts[id] = match self.nodes[id].kind {
                    NodeKind::Terminal { .. } | NodeKind::Epsilon { .. } => 1,
                    _ => self.nodes[id].packed.iter().fold(0u128, |acc, p| {
                        let product = p
                            .children
                            .iter()
                            .fold(1u128, |prod, &c| prod.saturating_mul(counts[c]));
                        acc.saturating_add(product)
                    }),
                };
                mark[id] = Mark::Done;
                continue;
            }
            match mark[id] {
                Mark::Done => continue,
                Mark::Open => return None,
                Mark::New => {
                    mark[id] = Mark::Open;
                    stack.push((id, true));
                    for child in self.child_ids(id) {
                        match mark[child] {
                            Mark::Open => return None,
                            Mark::New => stack.push((child, false)),
                            Mark::Done => {}
                        }
                    }
                }
            }
        }
        Some(counts[root])
    }

    /// Label of a node, e.g. `S [0, 2]` or `'a' [1, 2]`.
    pub fn label(&self, grammar: &Grammar<T>, id: NodeId) -> String {
        match &self.nodes[id].kind {
            NodeKind::Symbol {
                nonterm,
                left,
                right,
            } => format!("{} [{}, {}]", grammar.name(*nonterm), left, right),
            NodeKind::Intermediate { slot, left, right } => {
                format!("{} [{}, {}]", grammar.display_slot(*slot), left, right)
            }
            NodeKind::Terminal { value, left } => format!("{:?} [{}, {}]", value, left, left + 1),
            NodeKind::Epsilon { at } => format!("ε [{}, {}]", at, at),
        }
    }

    /// Indented text rendering. Nodes already printed appear as `^#id`.
    pub fn render(&self, grammar: &Grammar<T>) -> String {
        enum Item {
            Node(NodeId),
            Packed(NodeId, usize),
        }

        let mut out = String::new();
        let Some(root) = self.root else {
            out.push_str("(no derivation)\n");
            return out;
        };
        let mut printed: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![(Item::Node(root), 0usize)];

        while let Some((item, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match item {
                Item::Node(id) => {
                    if !printed.insert(id) {
                        let _ = writeln!(out, "{}^#{} {}", indent, id, self.label(grammar, id));
                        continue;
                    }
                    let _ = writeln!(out, "{}#{} {}", indent, id, self.label(grammar, id));
                    let node = &self.nodes[id];
                    if node.is_ambiguous() {
                        for idx in (0..node.packed.len()).rev() {
                            stack.push((Item::Packed(id, idx), depth + 1));
                        }
                    } else if let Some(p) = node.packed.first() {
                        for &c in p.children.iter().rev() {
                            stack.push((Item::Node(c), depth + 1));
                        }
                    }
                }
                Item::Packed(id, idx) => {
                    let p = &self.nodes[id].packed[idx];
                    let _ = writeln!(out, "{}| {} @{}", indent, grammar.display_slot(p.slot), p.split);
                    for &c in p.children.iter().rev() {
                        stack.push((Item::Node(c), depth + 1));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "tests/sppf.rs"]
mod tests;
