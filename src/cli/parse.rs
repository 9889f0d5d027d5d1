//! Input parsing for REPL commands.

/// Commands that can be entered in the REPL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `load <file>`
    Load { filename: String },
    /// `rule <Name ::= ...>`
    Rule { text: String },
    /// `start <Name>`
    Start { name: String },
    /// `parse <text>` or `?- <text>`; a quoted argument keeps its spaces.
    Parse { text: String },
    Roots,
    Forest,
    Sppf,
    List,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Unexpected character: '{0}'")]
    UnexpectedChar(char),
    #[error("Invalid command: '{0}'")]
    InvalidCommand(String),
    #[error("Missing argument: {0}")]
    MissingArgument(String),
}

/// Parser for one line of REPL input.
pub struct CommandParser {
    input: Vec<char>,
    pos: usize,
}

impl CommandParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Command, CommandError> {
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(Command::Empty);
        }

        if self.peek() == Some('?') {
            self.advance();
            if self.peek() == Some('-') {
                self.advance();
                let text = self.parse_text()?;
                return Ok(Command::Parse { text });
            }
            return Err(CommandError::UnexpectedChar(self.peek().unwrap_or('?')));
        }

        let keyword = self.parse_identifier();
        self.skip_whitespace();

        match keyword.as_str() {
            "load" => {
                let filename = self.parse_string_or_word()?;
                if filename.is_empty() {
                    return Err(CommandError::MissingArgument("filename".to_string()));
                }
                Ok(Command::Load { filename })
            }
            "rule" => {
                let text = self.parse_until_end();
                if text.is_empty() {
                    return Err(CommandError::MissingArgument("rule".to_string()));
                }
                Ok(Command::Rule { text })
            }
            "start" => {
                let name = self.parse_identifier();
                if name.is_empty() {
                    return Err(CommandError::MissingArgument("start symbol".to_string()));
                }
                Ok(Command::Start { name })
            }
            "parse" | "p" => {
                let text = self.parse_text()?;
                Ok(Command::Parse { text })
            }
            "roots" => Ok(Command::Roots),
            "forest" | "bsr" => Ok(Command::Forest),
            "sppf" | "tree" => Ok(Command::Sppf),
            "list" | "ls" | "grammar" => Ok(Command::List),
            "help" | "h" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => match self.peek() {
                Some(c) => Err(CommandError::UnexpectedChar(c)),
                None => Ok(Command::Empty),
            },
            _ => Err(CommandError::InvalidCommand(keyword)),
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn parse_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                result.push(c);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn parse_filename(&mut self) -> String {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '/' || c == '-' {
                result.push(c);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn parse_until_end(&mut self) -> String {
        let result: String = self.input[self.pos..].iter().collect();
        self.pos = self.input.len();
        result.trim().to_string()
    }

    /// Input text to parse: a double-quoted string, or the trimmed rest of the line.
    fn parse_text(&mut self) -> Result<String, CommandError> {
        self.skip_whitespace();
        if self.peek() == Some('"') {
            let text = self.parse_quoted()?;
            self.skip_whitespace();
            return match self.peek() {
                Some(c) => Err(CommandError::UnexpectedChar(c)),
                None => Ok(text),
            };
        }
        let text = self.parse_until_end();
        if text.is_empty() {
            return Err(CommandError::MissingArgument(
                "input text (use \"\" for empty input)".to_string(),
            ));
        }
        Ok(text)
    }

    fn parse_quoted(&mut self) -> Result<String, CommandError> {
        self.advance();
        let mut result = String::new();
        while let Some(c) = self.advance() {
            match c {
                '"' => return Ok(result),
                '\\' => match self.advance() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some(other) => result.push(other),
                    None => return Err(CommandError::UnexpectedEof),
                },
                _ => result.push(c),
            }
        }
        Err(CommandError::UnexpectedEof)
    }

    fn parse_string_or_word(&mut self) -> Result<String, CommandError> {
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(String::new());
        }

        if self.peek() == Some('"') {
            self.parse_quoted()
        } else {
            Ok(self.parse_filename())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, CommandError> {
        CommandParser::new(line).parse()
    }

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(parse(""), Ok(Command::Empty));
        assert_eq!(parse("   \t\n  "), Ok(Command::Empty));
    }

    #[test]
    fn query_prefix_is_parse() {
        assert_eq!(
            parse("?- ()()"),
            Ok(Command::Parse {
                text: "()()".to_string()
            })
        );
    }

    #[test]
    fn parse_trims_unquoted_text() {
        assert_eq!(
            parse("  parse   a+b  "),
            Ok(Command::Parse {
                text: "a+b".to_string()
            })
        );
    }

    #[test]
    fn quoted_text_keeps_spaces() {
        assert_eq!(
            parse("parse \" a b \""),
            Ok(Command::Parse {
                text: " a b ".to_string()
            })
        );
    }

    #[test]
    fn empty_quoted_text_is_empty_input() {
        assert_eq!(parse("?- \"\""), Ok(Command::Parse { text: String::new() }));
    }

    #[test]
    fn parse_without_text_is_error() {
        assert!(matches!(parse("parse"), Err(CommandError::MissingArgument(_))));
    }

    #[test]
    fn trailing_garbage_after_quote() {
        assert_eq!(parse("parse \"a\" b"), Err(CommandError::UnexpectedChar('b')));
    }

    #[test]
    fn unterminated_quote() {
        assert_eq!(parse("parse \"abc"), Err(CommandError::UnexpectedEof));
    }

    #[test]
    fn question_mark_without_dash() {
        assert_eq!(parse("?x"), Err(CommandError::UnexpectedChar('x')));
    }

    #[test]
    fn load_word_and_quoted() {
        assert_eq!(
            parse("load demos/parens.bnf"),
            Ok(Command::Load {
                filename: "demos/parens.bnf".to_string()
            })
        );
        assert_eq!(
            parse("load \"my grammar.bnf\""),
            Ok(Command::Load {
                filename: "my grammar.bnf".to_string()
            })
        );
        assert!(matches!(parse("load"), Err(CommandError::MissingArgument(_))));
    }

    #[test]
    fn rule_takes_rest_of_line() {
        assert_eq!(
            parse("rule S ::= 'a' S | ε"),
            Ok(Command::Rule {
                text: "S ::= 'a' S | ε".to_string()
            })
        );
        assert!(matches!(parse("rule   "), Err(CommandError::MissingArgument(_))));
    }

    #[test]
    fn start_takes_identifier() {
        assert_eq!(
            parse("start Expr"),
            Ok(Command::Start {
                name: "Expr".to_string()
            })
        );
        assert!(matches!(parse("start"), Err(CommandError::MissingArgument(_))));
    }

    #[test]
    fn keyword_aliases() {
        assert_eq!(parse("roots"), Ok(Command::Roots));
        assert_eq!(parse("forest"), Ok(Command::Forest));
        assert_eq!(parse("bsr"), Ok(Command::Forest));
        assert_eq!(parse("sppf"), Ok(Command::Sppf));
        assert_eq!(parse("tree"), Ok(Command::Sppf));
        assert_eq!(parse("ls"), Ok(Command::List));
        assert_eq!(parse("h"), Ok(Command::Help));
        assert_eq!(parse("exit"), Ok(Command::Quit));
        assert_eq!(parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn unknown_keyword() {
        assert_eq!(
            parse("frobnicate"),
            Err(CommandError::InvalidCommand("frobnicate".to_string()))
        );
    }

    #[test]
    fn stray_symbol() {
        assert_eq!(parse("!"), Err(CommandError::UnexpectedChar('!')));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            CommandError::MissingArgument("filename".to_string()).to_string(),
            "Missing argument: filename"
        );
        assert_eq!(CommandError::UnexpectedEof.to_string(), "Unexpected end of input");
    }
}
