//! REPL (Read-Eval-Print Loop) for building grammars and parsing text.

use std::io::{self, BufRead, Write};

use crate::engine::{Engine, EngineConfig, Fixpoint};
use crate::error::GllError;
use crate::forest::Forest;
use crate::grammar::{Grammar, NonTermId};
use crate::sppf::Sppf;

use super::compiler::{CompileError, Compiler};
use super::file_parser::{FileParseError, FileParser};
use super::parse::{Command, CommandError, CommandParser};

/// The last successful parse, kept for `roots`, `forest` and `sppf`.
struct LastParse {
    input: Vec<char>,
    start: NonTermId,
    fix: Fixpoint,
}

/// The REPL state and configuration.
pub struct Repl {
    grammar: Grammar<char>,
    start: Option<NonTermId>,
    /// Step bound per parse.
    max_steps: usize,
    /// Print metrics after each parse.
    verbose: bool,
    prompt: String,
    last: Option<LastParse>,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            grammar: Grammar::new(),
            start: None,
            max_steps: 1_000_000,
            verbose: false,
            prompt: "fungll> ".to_string(),
            last: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn grammar(&self) -> &Grammar<char> {
        &self.grammar
    }

    pub fn start(&self) -> Option<NonTermId> {
        self.start
    }

    /// Run the REPL with the given input and output streams.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> io::Result<()> {
        self.print_banner(output)?;

        loop {
            write!(output, "{}", self.prompt)?;
            output.flush()?;

            let mut line = String::new();
            let bytes_read = input.read_line(&mut line)?;

            if bytes_read == 0 {
                writeln!(output, "\nGoodbye!")?;
                break;
            }

            match self.process_line(&line) {
                Ok(ReplAction::Continue) => {}
                Ok(ReplAction::Quit) => {
                    writeln!(output, "Goodbye!")?;
                    break;
                }
                Ok(ReplAction::Print(msg)) => {
                    writeln!(output, "{}", msg)?;
                }
                Err(e) => {
                    writeln!(output, "Error: {}", e)?;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> Result<ReplAction, ReplError> {
        let cmd = CommandParser::new(line).parse()?;

        match cmd {
            Command::Empty => Ok(ReplAction::Continue),
            Command::Quit => Ok(ReplAction::Quit),
            Command::Help => Ok(ReplAction::Print(Self::help_text())),
            Command::List => Ok(ReplAction::Print(self.list_grammar())),
            Command::Load { filename } => self.load(&filename).map(ReplAction::Print),
            Command::Rule { text } => self.handle_rule(&text).map(ReplAction::Print),
            Command::Start { name } => self.handle_start(&name).map(ReplAction::Print),
            Command::Parse { text } => self.handle_parse(&text).map(ReplAction::Print),
            Command::Roots => self.handle_roots().map(ReplAction::Print),
            Command::Forest => self.handle_forest().map(ReplAction::Print),
            Command::Sppf => self.handle_sppf().map(ReplAction::Print),
        }
    }

    fn print_banner<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(output, "fungll - generalized LL parsing to BSR forests")?;
        writeln!(output, "Type 'help' for available commands, 'quit' to exit.")?;
        writeln!(output)?;
        Ok(())
    }

    fn help_text() -> String {
        r#"Available commands:
  load <file>          Load rules from a .bnf grammar file
  rule <Name ::= ...>  Add a rule
  start <Name>         Set the start symbol
  parse <text>         Parse text (alias: ?- <text>; use "" for empty input)
  roots                Show accepting BSRs of the last parse
  forest               Show every BSR of the last parse
  sppf                 Show the shared packed parse forest of the last parse
  list                 Show the grammar
  help                 Show this help message
  quit                 Exit the REPL

Examples:
  rule P ::= '(' P ')' P | ε
  ?- ()()
  load demos/arith.bnf
"#
        .to_string()
    }

    fn list_grammar(&self) -> String {
        if self.grammar.rule_count() == 0 {
            return "Grammar:\n  (no rules defined yet)".to_string();
        }
        let mut result = String::from("Grammar:\n");
        for line in self.grammar.to_string().lines() {
            result.push_str("  ");
            result.push_str(line);
            result.push('\n');
        }
        if let Some(start) = self.start {
            result.push_str(&format!("Start: {}", self.grammar.name(start)));
        }
        let undefined: Vec<&str> = self
            .grammar
            .undefined_nonterms()
            .into_iter()
            .map(|nt| self.grammar.name(nt))
            .collect();
        if !undefined.is_empty() {
            result.push_str(&format!("\nWarning: undefined non-terminal(s): {}", undefined.join(", ")));
        }
        result
    }

    /// Load a `.bnf` file from `path`, taken verbatim.
    pub fn load(&mut self, path: impl AsRef<std::path::Path>) -> Result<String, ReplError> {
        let content = std::fs::read_to_string(path)?;
        let parsed = FileParser::new(&content).parse_file()?;
        let loaded = Compiler::new(&mut self.grammar).compile_file(&parsed)?;
        self.start.get_or_insert(loaded.first);
        self.last = None;
        Ok(format!(
            "Loaded {} rule(s) for {} non-terminal(s): {}",
            loaded.rules.len(),
            loaded.defined.len(),
            loaded.defined.join(", ")
        ))
    }

    fn handle_rule(&mut self, text: &str) -> Result<String, ReplError> {
        let mut parser = FileParser::new(text);
        let def = parser.parse_rule()?;
        parser.finish()?;
        let loaded = Compiler::new(&mut self.grammar).compile_rule(&def)?;
        self.start.get_or_insert(loaded.first);
        self.last = None;
        Ok(format!("Added {} alternative(s) to {}", loaded.rules.len(), def.name))
    }

    fn handle_start(&mut self, name: &str) -> Result<String, ReplError> {
        let nt = self
            .grammar
            .lookup(name)
            .ok_or_else(|| ReplError::Execution(format!("unknown non-terminal '{}'", name)))?;
        self.start = Some(nt);
        Ok(format!("Start symbol: {}", name))
    }

    fn handle_parse(&mut self, text: &str) -> Result<String, ReplError> {
        let start = self
            .start
            .ok_or_else(|| ReplError::Execution("no grammar loaded".to_string()))?;
        let input: Vec<char> = text.chars().collect();
        let config = EngineConfig::new().with_max_steps(self.max_steps);
        let fix = Engine::with_config(&self.grammar, config).run(&input, start)?;

        let mut result = if fix.accepted() {
            format!(
                "Accepted: {} root(s), {} BSR(s), {} step(s)",
                fix.roots.len(),
                fix.forest.len(),
                fix.steps
            )
        } else {
            format!(
                "Rejected: no derivation of {} for {:?} ({} BSR(s), {} step(s))",
                self.grammar.name(start),
                text,
                fix.forest.len(),
                fix.steps
            )
        };
        if self.verbose {
            result.push('\n');
            result.push_str(&fix.metrics.to_string());
        }
        self.last = Some(LastParse { input, start, fix });
        Ok(result)
    }

    fn last_parse(&self) -> Result<&LastParse, ReplError> {
        self.last
            .as_ref()
            .ok_or_else(|| ReplError::Execution("nothing parsed yet".to_string()))
    }

    fn handle_roots(&self) -> Result<String, ReplError> {
        let last = self.last_parse()?;
        if last.fix.roots.is_empty() {
            return Ok("No roots.".to_string());
        }
        Ok(Forest::display_bsrs(&self.grammar, &last.fix.roots).to_string())
    }

    fn handle_forest(&self) -> Result<String, ReplError> {
        let last = self.last_parse()?;
        Ok(last.fix.forest.display(&self.grammar).to_string())
    }

    fn handle_sppf(&self) -> Result<String, ReplError> {
        let last = self.last_parse()?;
        let sppf = Sppf::from_forest(&self.grammar, &last.fix.forest, last.start, last.input.len());
        let mut result = sppf.render(&self.grammar);
        match sppf.count_trees() {
            Some(n) => result.push_str(&format!("Trees: {}", n)),
            None => result.push_str("Trees: infinitely many (cyclic)"),
        }
        Ok(result)
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

/// Actions the REPL can take after processing a command.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplAction {
    Continue,
    Quit,
    Print(String),
}

/// Errors that can occur in the REPL.
#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
    #[error("Grammar error: {0}")]
    Grammar(#[from] FileParseError),
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("Parse error: {0}")]
    Gll(#[from] GllError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Execution error: {0}")]
    Execution(String),
}

#[cfg(test)]
#[path = "../tests/repl.rs"]
mod tests;
