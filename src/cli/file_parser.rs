//! Parser for `.bnf` grammar files.
//!
//! # Syntax
//!
//! ```text
//! # Comments start with #
//!
//! # A rule lists alternatives separated by `|` and ends with `;`
//! # (the final `;` of a file may be omitted).
//! Parens ::= '(' Parens ')' Parens | ε ;
//!
//! # 'c' is one character, "abc" is shorthand for 'a' 'b' 'c'.
//! Kw ::= "let" | "in" ;
//!
//! # Epsilon is `ε`, `eps`, or simply an empty alternative.
//! Opt ::= 'x' | ;
//! ```
//!
//! Identifiers name non-terminals. Inside quotes `\\`, `\'`, `\"`, `\n`,
//! `\t` and `\r` are recognised.

/// A parsed grammar file: rules in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedGrammar {
    pub rules: Vec<RuleDef>,
}

impl ParsedGrammar {
    /// Left-hand side of the first rule, the default start symbol.
    pub fn first_lhs(&self) -> Option<&str> {
        self.rules.first().map(|r| r.name.as_str())
    }
}

/// `Name ::= alt | alt ;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDef {
    pub name: String,
    pub alternatives: Vec<Vec<ParsedSymbol>>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSymbol {
    NonTerm(String),
    Term(char),
}

/// Grammar file error with location information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{col}: {message}")]
pub struct FileParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

/// Recursive-descent parser over the characters of a grammar file.
pub struct FileParser {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl FileParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Parse the entire file.
    pub fn parse_file(&mut self) -> Result<ParsedGrammar, FileParseError> {
        let mut rules = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }
            rules.push(self.parse_rule()?);
        }
        Ok(ParsedGrammar { rules })
    }

    /// Parse one `Name ::= ... ;` rule. The `;` may be omitted at end of input.
    pub fn parse_rule(&mut self) -> Result<RuleDef, FileParseError> {
        self.skip_whitespace_and_comments();
        let line = self.line;

        let name = self.parse_identifier();
        if name.is_empty() {
            return Err(self.error(format!(
                "Expected non-terminal name, found {:?}",
                self.peek()
            )));
        }

        self.skip_whitespace_and_comments();
        if !self.consume_str("::=") {
            return Err(self.error(format!("Expected '::=' after '{}'", name)));
        }

        let mut alternatives = vec![self.parse_alternative()?];
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                Some('|') => {
                    self.advance();
                    alternatives.push(self.parse_alternative()?);
                }
                Some(';') => {
                    self.advance();
                    break;
                }
                None => break,
                Some(c) => {
                    return Err(self.error(format!("Expected '|' or ';', found '{}'", c)));
                }
            }
        }

        Ok(RuleDef {
            name,
            alternatives,
            line,
        })
    }

    /// Fail unless only whitespace and comments remain.
    pub fn finish(&mut self) -> Result<(), FileParseError> {
        self.skip_whitespace_and_comments();
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(self.error(format!("Unexpected input after rule: '{}'", c))),
        }
    }

    /// Symbols up to the next `|`, `;` or end of input.
    fn parse_alternative(&mut self) -> Result<Vec<ParsedSymbol>, FileParseError> {
        let mut symbols = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None | Some('|') | Some(';') => return Ok(symbols),
                Some('ε') => {
                    self.advance();
                }
                Some('\'') => {
                    let text = self.parse_quoted('\'')?;
                    let mut chars = text.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => symbols.push(ParsedSymbol::Term(c)),
                        _ => {
                            return Err(self.error(format!(
                                "Character literal must hold exactly one character, found '{}'",
                                text
                            )))
                        }
                    }
                }
                Some('"') => {
                    let text = self.parse_quoted('"')?;
                    symbols.extend(text.chars().map(ParsedSymbol::Term));
                }
                Some(c) if is_ident_start(c) => {
                    let ident = self.parse_identifier();
                    if ident != "eps" {
                        symbols.push(ParsedSymbol::NonTerm(ident));
                    }
                }
                Some(c) => {
                    return Err(self.error(format!("Unexpected character '{}'", c)));
                }
            }
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, FileParseError> {
        self.advance();
        let mut text = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(self.error(format!("Unterminated literal, expected {}", quote)));
                }
                Some('\\') => {
                    let escaped = match self.advance() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(c @ ('\\' | '\'' | '"')) => c,
                        Some(c) => return Err(self.error(format!("Unknown escape '\\{}'", c))),
                        None => return Err(self.error("Unterminated escape".to_string())),
                    };
                    text.push(escaped);
                }
                Some(c) if c == quote => return Ok(text),
                Some(c) => text.push(c),
            }
        }
    }

    fn parse_identifier(&mut self) -> String {
        let mut result = String::new();
        match self.peek() {
            Some(c) if is_ident_start(c) => {}
            _ => return result,
        }
        while let Some(c) = self.peek() {
            if is_ident_start(c) || c.is_ascii_digit() {
                result.push(c);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn consume_str(&mut self, s: &str) -> bool {
        let n = s.chars().count();
        if self.pos + n > self.input.len() {
            return false;
        }
        if self.input[self.pos..self.pos + n].iter().copied().eq(s.chars()) {
            for _ in 0..n {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn error(&self, message: String) -> FileParseError {
        FileParseError {
            line: self.line,
            col: self.col,
            message,
        }
    }
}

fn is_ident_start(c: char) -> bool {
    (c.is_alphabetic() && c != 'ε') || c == '_'
}

#[cfg(test)]
#[path = "../tests/file_parser.rs"]
mod tests;
