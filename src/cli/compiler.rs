//! Compiler from parsed grammar files to [`Grammar<char>`].

use hashbrown::HashSet;

use crate::grammar::{Grammar, NonTermId, RuleId, Symbol};

use super::file_parser::{ParsedGrammar, ParsedSymbol, RuleDef};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("grammar defines no rules")]
    Empty,

    /// The same right-hand side listed twice for one non-terminal.
    #[error("line {line}: duplicate alternative `{alternative}` for `{name}`")]
    DuplicateAlternative {
        name: String,
        alternative: String,
        line: usize,
    },
}

/// Summary of what a compile added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    /// Left-hand sides, in first-seen order.
    pub defined: Vec<String>,
    pub rules: Vec<RuleId>,
    /// Left-hand side of the first rule.
    pub first: NonTermId,
}

/// Adds parsed rules to an existing character grammar.
pub struct Compiler<'a> {
    grammar: &'a mut Grammar<char>,
}

impl<'a> Compiler<'a> {
    pub fn new(grammar: &'a mut Grammar<char>) -> Self {
        Self { grammar }
    }

    /// Compile every rule of a file. Nothing is added if any rule is rejected.
    pub fn compile_file(&mut self, file: &ParsedGrammar) -> Result<Loaded, CompileError> {
        if file.rules.is_empty() {
            return Err(CompileError::Empty);
        }
        self.check_duplicates(&file.rules)?;

        let mut defined: Vec<String> = Vec::new();
        let mut rules = Vec::new();
        let mut first = None;
        for def in &file.rules {
            let lhs = self.grammar.nonterminal(&def.name);
            first.get_or_insert(lhs);
            if !defined.contains(&def.name) {
                defined.push(def.name.clone());
            }
            for alt in &def.alternatives {
                let rhs: Vec<Symbol<char>> = alt.iter().map(|s| self.symbol(s)).collect();
                rules.push(self.grammar.add_rule(lhs, rhs));
            }
        }

        let first = first.ok_or(CompileError::Empty)?;
        Ok(Loaded {
            defined,
            rules,
            first,
        })
    }

    /// Compile a single rule, as entered at the prompt.
    pub fn compile_rule(&mut self, def: &RuleDef) -> Result<Loaded, CompileError> {
        self.compile_file(&ParsedGrammar {
            rules: vec![def.clone()],
        })
    }

    fn symbol(&mut self, sym: &ParsedSymbol) -> Symbol<char> {
        match sym {
            ParsedSymbol::Term(c) => Symbol::Term(*c),
            ParsedSymbol::NonTerm(name) => Symbol::NonTerm(self.grammar.nonterminal(name)),
        }
    }

    /// Reject alternatives repeated within the batch or already in the grammar.
    fn check_duplicates(&self, defs: &[RuleDef]) -> Result<(), CompileError> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for (_, rule) in self.grammar.rules() {
            let name = self.grammar.name(rule.lhs).to_string();
            seen.insert((name, render_existing(self.grammar, &rule.rhs)));
        }
        for def in defs {
            for alt in &def.alternatives {
                let text = render_parsed(alt);
                if !seen.insert((def.name.clone(), text.clone())) {
                    return Err(CompileError::DuplicateAlternative {
                        name: def.name.clone(),
                        alternative: text,
                        line: def.line,
                    });
                }
            }
        }
        Ok(())
    }
}

fn render_parsed(alt: &[ParsedSymbol]) -> String {
    if alt.is_empty() {
        return "ε".to_string();
    }
    alt.iter()
        .map(|s| match s {
            ParsedSymbol::Term(c) => format!("{:?}", c),
            ParsedSymbol::NonTerm(n) => n.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_existing(grammar: &Grammar<char>, rhs: &[Symbol<char>]) -> String {
    if rhs.is_empty() {
        return "ε".to_string();
    }
    rhs.iter()
        .map(|s| match s {
            Symbol::Term(c) => format!("{:?}", c),
            Symbol::NonTerm(nt) => grammar.name(*nt).to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
