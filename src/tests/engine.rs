use super::*;
use crate::descriptor::Commencement;
use crate::grammar::{Slot, Symbol};
use crate::test_utils::{
    ambiguous_a, balanced_parens, chars, cyclic_e, epsilon_only, left_recursive_sum, nt, t,
};

fn run(g: &Grammar<char>, start: NonTermId, input: &str) -> Fixpoint {
    let fix = fungll(g, &chars(input), start).unwrap();
    fix.forest.check_invariants(input.chars().count()).unwrap();
    fix
}

fn run_with(g: &Grammar<char>, start: NonTermId, input: &str, order: WorklistOrder) -> Fixpoint {
    let config = EngineConfig::new().with_order(order);
    Engine::with_config(g, config).run(&chars(input), start).unwrap()
}

// ========== CONFIG ==========

#[test]
fn config_defaults_and_builders() {
    let config = EngineConfig::default();
    assert_eq!(config.max_steps, None);
    assert_eq!(config.order, WorklistOrder::Fifo);

    let config = EngineConfig::new()
        .with_max_steps(10)
        .with_order(WorklistOrder::Lifo);
    assert_eq!(config.max_steps, Some(10));
    assert_eq!(config.order, WorklistOrder::Lifo);
}

// ========== AMBIGUITY ==========

#[test]
fn short_alternative_on_single_a() {
    let (g, s) = ambiguous_a();
    let fix = run(&g, s, "a");
    let short = g.alternatives(s)[0];
    assert_eq!(fix.roots, vec![Bsr::new(Slot { rule: short, dot: 1 }, 0, 0, 1)]);
}

#[test]
fn long_alternative_on_double_a() {
    let (g, s) = ambiguous_a();
    let fix = run(&g, s, "aa");
    let short = g.alternatives(s)[0];
    let long = g.alternatives(s)[1];
    assert_eq!(fix.roots, vec![Bsr::new(Slot { rule: long, dot: 2 }, 0, 1, 2)]);
    assert!(!fix.roots.iter().any(|b| b.slot.rule == short));

    let expected: Forest = [
        Bsr::new(Slot { rule: short, dot: 1 }, 0, 0, 1),
        Bsr::new(Slot { rule: long, dot: 1 }, 0, 0, 1),
        Bsr::new(Slot { rule: long, dot: 2 }, 0, 1, 2),
    ]
    .into_iter()
    .collect();
    assert_eq!(fix.forest, expected);
    assert_eq!(fix.visited.len(), 5);
}

// ========== EPSILON ==========

#[test]
fn epsilon_on_empty_input() {
    let (g, s) = epsilon_only();
    let fix = run(&g, s, "");
    let slot = Slot::start(g.alternatives(s)[0]);
    assert!(fix.forest.contains(&Bsr::new(slot, 0, 0, 0)));
    assert_eq!(fix.roots, vec![Bsr::new(slot, 0, 0, 0)]);
    assert!(fix.accepted());
}

#[test]
fn epsilon_does_not_cover_input() {
    let (g, s) = epsilon_only();
    let fix = run(&g, s, "x");
    assert!(fix.roots.is_empty());
    assert!(!fix.accepted());
}

#[test]
fn nullable_nonempty_rule_gets_zero_width_bsr() {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let a = g.nonterminal("A");
    let rs = g.add_rule(s, [nt(a), nt(a)]);
    g.add_rule(a, []);
    let fix = run(&g, s, "");
    assert!(fix.accepted());
    assert_eq!(fix.roots, vec![Bsr::new(Slot { rule: rs, dot: 2 }, 0, 0, 0)]);
}

// ========== BALANCED PARENS ==========

#[test]
fn balanced_parens_accepts() {
    let (g, p) = balanced_parens();
    assert!(run(&g, p, "()()").accepted());
    assert!(run(&g, p, "(()())").accepted());
    assert!(run(&g, p, "").accepted());
}

#[test]
fn balanced_parens_rejects() {
    let (g, p) = balanced_parens();
    assert!(!run(&g, p, ")(").accepted());
    assert!(!run(&g, p, "(()").accepted());
}

#[test]
fn balanced_parens_root_spans_input() {
    let (g, p) = balanced_parens();
    let fix = run(&g, p, "()()");
    assert!(!fix.roots.is_empty());
    assert!(fix.roots.iter().all(|b| b.left == 0 && b.right == 4));
}

// ========== LEFT RECURSION AND CYCLES ==========

#[test]
fn cyclic_grammar_terminates() {
    let (g, e) = cyclic_e();
    assert!(run(&g, e, "1").accepted());
    assert!(run(&g, e, "").accepted());
    assert!(run(&g, e, "111").accepted());
    assert!(!run(&g, e, "12").accepted());
}

#[test]
fn cyclic_grammar_empty_root_is_epsilon() {
    let (g, e) = cyclic_e();
    let fix = run(&g, e, "");
    let eps = g.alternatives(e)[2];
    assert!(fix.roots.contains(&Bsr::new(Slot::start(eps), 0, 0, 0)));
}

#[test]
fn left_recursion() {
    let (g, e) = left_recursive_sum();
    assert!(run(&g, e, "n").accepted());
    assert!(run(&g, e, "n+n+n").accepted());
    assert!(!run(&g, e, "n+").accepted());
    assert!(!run(&g, e, "+n").accepted());
}

#[test]
fn left_recursion_records_each_prefix() {
    let (g, e) = left_recursive_sum();
    let fix = run(&g, e, "n+n");
    let rec = g.alternatives(e)[0];
    // E ::= E • '+' 'n' with E over [0, 1)
    assert!(fix.forest.contains(&Bsr::new(Slot { rule: rec, dot: 1 }, 0, 0, 1)));
    assert_eq!(fix.roots, vec![Bsr::new(Slot { rule: rec, dot: 3 }, 0, 2, 3)]);
}

#[test]
fn indirect_left_recursion() {
    let mut g = Grammar::new();
    let a = g.nonterminal("A");
    let b = g.nonterminal("B");
    g.add_rule(a, [nt(b), t('a')]);
    g.add_rule(a, [t('x')]);
    g.add_rule(b, [nt(a), t('b')]);
    assert!(recognize(&g, &chars("xba"), a).unwrap());
    assert!(recognize(&g, &chars("xbaba"), a).unwrap());
    assert!(!recognize(&g, &chars("xbb"), a).unwrap());
}

// ========== CONFLUENCE ==========

#[test]
fn fifo_and_lifo_reach_the_same_fixpoint() {
    let cases: Vec<(Grammar<char>, NonTermId, &str)> = vec![
        {
            let (g, s) = ambiguous_a();
            (g, s, "aa")
        },
        {
            let (g, p) = balanced_parens();
            (g, p, "(()())()")
        },
        {
            let (g, e) = cyclic_e();
            (g, e, "1111")
        },
        {
            let (g, e) = left_recursive_sum();
            (g, e, "n+n+n")
        },
    ];
    for (g, start, input) in &cases {
        let fifo = run_with(g, *start, input, WorklistOrder::Fifo);
        let lifo = run_with(g, *start, input, WorklistOrder::Lifo);
        assert_eq!(fifo.forest, lifo.forest, "forest differs on {:?}", input);
        assert_eq!(fifo.visited, lifo.visited, "U differs on {:?}", input);
        assert_eq!(fifo.roots, lifo.roots);
    }
}

#[test]
fn repeated_runs_are_identical() {
    let (g, e) = cyclic_e();
    let first = run(&g, e, "11");
    let second = run(&g, e, "11");
    assert_eq!(first.forest, second.forest);
    assert_eq!(first.visited, second.visited);
}

#[test]
fn each_descriptor_expanded_once() {
    let (g, e) = cyclic_e();
    let fix = run(&g, e, "111");
    assert_eq!(fix.steps, fix.visited.len());
}

// ========== ERRORS AND LIMITS ==========

#[test]
fn undefined_start_symbol() {
    let mut g: Grammar<char> = Grammar::new();
    let s = g.nonterminal("S");
    assert_eq!(
        fungll(&g, &chars(""), s).unwrap_err(),
        GllError::UndefinedNonTerminal {
            name: "S".to_string()
        }
    );
}

#[test]
fn undefined_nonterminal_only_when_reached() {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    let x = g.nonterminal("X");
    g.add_rule(s, [t('a'), nt(x)]);
    g.add_rule(s, [t('b')]);
    assert!(recognize(&g, &chars("b"), s).unwrap());
    assert!(matches!(
        recognize(&g, &chars("a"), s),
        Err(GllError::UndefinedNonTerminal { .. })
    ));
}

#[test]
fn step_limit_means_unknown() {
    let (g, e) = cyclic_e();
    let config = EngineConfig::new().with_max_steps(5);
    let err = Engine::with_config(&g, config).run(&chars("111"), e).unwrap_err();
    assert_eq!(err, GllError::StepLimitExceeded { steps: 5 });
}

#[test]
fn step_limit_not_hit_when_generous() {
    let (g, s) = ambiguous_a();
    let config = EngineConfig::new().with_max_steps(5);
    let fix = Engine::with_config(&g, config).run(&chars("aa"), s).unwrap();
    assert_eq!(fix.steps, 5);
    assert!(fix.accepted());
}

// ========== ENTRY POINTS ==========

#[test]
fn parser_is_reusable() {
    let (g, p) = balanced_parens();
    let parser = Parser::new(&g, p);
    assert_eq!(parser.start(), p);
    assert!(parser.recognize(&chars("()")).unwrap());
    assert!(!parser.recognize(&chars("(")).unwrap());
    let forest = parser.parse(&chars("()")).unwrap();
    assert!(forest.is_accepted(&g, p, 2));
}

#[test]
fn parse_returns_forest_only() {
    let (g, s) = ambiguous_a();
    let forest = parse(&g, &chars("a"), s).unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest.roots(&g, s, 1).len(), 1);
}

#[test]
fn run_from_custom_seed() {
    let (g, p) = balanced_parens();
    let engine = Engine::new(&g);
    let seed = Descriptor::new(Slot::start(g.alternatives(p)[0]), 1, 1);
    let fix = engine.run_from(&chars("(())"), [seed]).unwrap();
    assert!(fix.roots.is_empty());
    assert!(fix.visited.contains(&seed));
    assert!(fix.calls.has_extent(Commencement::new(p, 1), 3));
}

#[test]
fn call_table_is_populated() {
    let (g, p) = balanced_parens();
    let fix = run(&g, p, "()");
    assert!(fix.calls.call_count() >= 2);
    assert!(fix.calls.extent_count() >= 2);
    assert_eq!(fix.input_len, 2);
}

#[test]
fn terminals_of_other_types() {
    let mut g: Grammar<&str> = Grammar::new();
    let s = g.nonterminal("S");
    g.add_rule(s, [Symbol::Term("let"), Symbol::NonTerm(s)]);
    g.add_rule(s, [Symbol::Term("in")]);
    assert!(recognize(&g, &["let", "let", "in"], s).unwrap());
    assert!(!recognize(&g, &["in", "let"], s).unwrap());
}

#[cfg(feature = "tracing")]
#[test]
fn metrics_track_steps() {
    let (g, p) = balanced_parens();
    let fix = run(&g, p, "()()");
    assert_eq!(fix.metrics.steps as usize, fix.steps);
    assert_eq!(fix.metrics.bsrs_recorded as usize, fix.forest.len());
    assert!(fix.metrics.descends > 0);
}
