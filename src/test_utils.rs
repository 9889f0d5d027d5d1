use crate::grammar::{Grammar, NonTermId, Symbol};

pub(crate) fn t(c: char) -> Symbol<char> {
    Symbol::Term(c)
}

pub(crate) fn nt(id: NonTermId) -> Symbol<char> {
    Symbol::NonTerm(id)
}

pub(crate) fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

/// `S ::= 'a' | 'a' 'a'`
pub(crate) fn ambiguous_a() -> (Grammar<char>, NonTermId) {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    g.add_rule(s, [t('a')]);
    g.add_rule(s, [t('a'), t('a')]);
    (g, s)
}

/// `S ::= ε`
pub(crate) fn epsilon_only() -> (Grammar<char>, NonTermId) {
    let mut g = Grammar::new();
    let s = g.nonterminal("S");
    g.add_rule(s, []);
    (g, s)
}

/// `P ::= '(' P ')' P | ε`
pub(crate) fn balanced_parens() -> (Grammar<char>, NonTermId) {
    let mut g = Grammar::new();
    let p = g.nonterminal("P");
    g.add_rule(p, [t('('), nt(p), t(')'), nt(p)]);
    g.add_rule(p, []);
    (g, p)
}

/// `E ::= E E E | '1' | ε`
pub(crate) fn cyclic_e() -> (Grammar<char>, NonTermId) {
    let mut g = Grammar::new();
    let e = g.nonterminal("E");
    g.add_rule(e, [nt(e), nt(e), nt(e)]);
    g.add_rule(e, [t('1')]);
    g.add_rule(e, []);
    (g, e)
}

/// `E ::= E '+' 'n' | 'n'`
pub(crate) fn left_recursive_sum() -> (Grammar<char>, NonTermId) {
    let mut g = Grammar::new();
    let e = g.nonterminal("E");
    g.add_rule(e, [nt(e), t('+'), t('n')]);
    g.add_rule(e, [t('n')]);
    (g, e)
}
