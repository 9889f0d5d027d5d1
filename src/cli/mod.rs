//! CLI module for fungll.
//!
//! Grammar file parsing, compilation to a character grammar, and the REPL.

pub mod compiler;
pub mod file_parser;
pub mod parse;
pub mod repl;

pub use compiler::{CompileError, Compiler, Loaded};
pub use file_parser::{FileParseError, FileParser, ParsedGrammar, ParsedSymbol, RuleDef};
pub use parse::{Command, CommandError, CommandParser};
pub use repl::{Repl, ReplAction, ReplError};
