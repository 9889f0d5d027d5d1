use fungll::{fungll, Engine, EngineConfig, Grammar, NonTermId, Symbol, WorklistOrder};
use proptest::prelude::*;

const TERMINALS: [char; 2] = ['a', 'b'];
const NAMES: [&str; 3] = ["A", "B", "C"];

#[derive(Clone, Debug)]
enum RawSymbol {
    Term(usize),
    NonTerm(usize),
}

/// Alternatives per non-terminal; index 0 is the start symbol.
type RawGrammar = Vec<Vec<Vec<RawSymbol>>>;

fn raw_symbol(nonterms: usize) -> impl Strategy<Value = RawSymbol> {
    prop_oneof![
        (0..TERMINALS.len()).prop_map(RawSymbol::Term),
        (0..nonterms).prop_map(RawSymbol::NonTerm),
    ]
}

fn raw_grammar() -> impl Strategy<Value = RawGrammar> {
    (1..=NAMES.len()).prop_flat_map(|n| {
        let alt = prop::collection::vec(raw_symbol(n), 0..=3);
        let rules = prop::collection::vec(alt, 1..=3);
        prop::collection::vec(rules, n..=n)
    })
}

fn input_strategy() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::sample::select(TERMINALS.to_vec()), 0..=5)
}

fn build(raw: &RawGrammar) -> (Grammar<char>, Vec<NonTermId>) {
    let mut g = Grammar::new();
    let ids: Vec<NonTermId> = NAMES[..raw.len()].iter().map(|n| g.nonterminal(n)).collect();
    for (lhs, alts) in raw.iter().enumerate() {
        for alt in alts {
            let rhs = alt.iter().map(|s| match s {
                RawSymbol::Term(i) => Symbol::Term(TERMINALS[*i]),
                RawSymbol::NonTerm(i) => Symbol::NonTerm(ids[*i]),
            });
            g.add_rule(ids[lhs], rhs);
        }
    }
    (g, ids)
}

/// Span table: `derives[x][l][r]` iff non-terminal `x` derives `input[l..r]`.
/// Grown to a fixpoint, so epsilon rules and cycles need no special casing.
fn span_table(raw: &RawGrammar, input: &[char]) -> Vec<Vec<Vec<bool>>> {
    let n = input.len();
    let mut derives = vec![vec![vec![false; n + 1]; n + 1]; raw.len()];
    loop {
        let mut changed = false;
        for (lhs, alts) in raw.iter().enumerate() {
            for alt in alts {
                for l in 0..=n {
                    let mut reach = vec![false; n + 1];
                    reach[l] = true;
                    for sym in alt {
                        let mut next = vec![false; n + 1];
                        for p in (0..=n).filter(|&p| reach[p]) {
                            match sym {
                                RawSymbol::Term(i) => {
                                    if p < n && input[p] == TERMINALS[*i] {
                                        next[p + 1] = true;
                                    }
                                }
                                RawSymbol::NonTerm(b) => {
                                    for q in p..=n {
                                        if derives[*b][p][q] {
                                            next[q] = true;
                                        }
                                    }
                                }
                            }
                        }
                        reach = next;
                    }
                    for r in l..=n {
                        if reach[r] && !derives[lhs][l][r] {
                            derives[lhs][l][r] = true;
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            return derives;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn bsrs_stay_within_input(raw in raw_grammar(), input in input_strategy()) {
        let (g, ids) = build(&raw);
        let fix = fungll(&g, &input, ids[0]).unwrap();
        prop_assert!(fix.forest.check_invariants(input.len()).is_ok());
        prop_assert_eq!(fix.steps, fix.visited.len());
        for d in &fix.visited {
            prop_assert!(d.left <= d.pos && d.pos <= input.len());
        }
    }

    #[test]
    fn acceptance_matches_span_table(raw in raw_grammar(), input in input_strategy()) {
        let (g, ids) = build(&raw);
        let fix = fungll(&g, &input, ids[0]).unwrap();
        let table = span_table(&raw, &input);
        prop_assert_eq!(fix.accepted(), table[0][0][input.len()]);
    }

    #[test]
    fn complete_bsrs_are_real_derivations(raw in raw_grammar(), input in input_strategy()) {
        let (g, ids) = build(&raw);
        let fix = fungll(&g, &input, ids[0]).unwrap();
        let table = span_table(&raw, &input);
        for b in fix.forest.iter().filter(|b| g.is_complete(b.slot)) {
            let lhs = g.lhs(b.slot);
            let x = ids.iter().position(|&id| id == lhs).unwrap();
            prop_assert!(table[x][b.left][b.right], "{:?} is not a derivation", b);
        }
    }

    #[test]
    fn worklist_order_does_not_change_the_fixpoint(
        raw in raw_grammar(),
        input in input_strategy(),
    ) {
        let (g, ids) = build(&raw);
        let fifo = Engine::with_config(&g, EngineConfig::new().with_order(WorklistOrder::Fifo))
            .run(&input, ids[0])
            .unwrap();
        let lifo = Engine::with_config(&g, EngineConfig::new().with_order(WorklistOrder::Lifo))
            .run(&input, ids[0])
            .unwrap();
        prop_assert_eq!(&fifo.forest, &lifo.forest);
        prop_assert_eq!(&fifo.visited, &lifo.visited);
        prop_assert_eq!(fifo.roots, lifo.roots);
    }
}
