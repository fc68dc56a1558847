use sd_core::{ErrorKind, ScriptDescError, SourceLocation, SourceSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Integer(i64),
    Str(String),
    Identifier(String),
    Punct(&'static str),
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            Self::Integer(value) => format!("integer {}", value),
            Self::Str(value) => format!("string \"{}\"", value),
            Self::Identifier(name) => format!("identifier \"{}\"", name),
            Self::Punct(symbol) => format!("\"{}\"", symbol),
            Self::Eof => "end of script".to_string(),
        }
    }

    /// Tokens that can begin the first argument of a command statement.
    pub fn starts_operand(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Str(_) | Self::Identifier(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
}

const PUNCTUATION: [&str; 33] = [
    "++", "--", "+=", "-=", "==", "!=", "<=", ">=", "&&", "||", "<<", ">>", "+", "-", "*", "/",
    "%", "&", "|", "^", "~", "!", "<", ">", "=", "?", ":", ",", ";", "(", ")", "{", "}",
];

struct Scanner {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptDescError> {
    let mut scanner = Scanner {
        chars: source.chars().collect(),
        position: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    loop {
        scanner.skip_trivia()?;
        let start = scanner.location();
        let Some(current) = scanner.peek(0) else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: SourceSpan {
                    start: start.clone(),
                    end: start,
                },
            });
            return Ok(tokens);
        };

        let kind = if current.is_ascii_digit() {
            scanner.integer()?
        } else if current == '"' {
            scanner.string()?
        } else if let Some(sigil) = scanner.identifier_sigil() {
            scanner.identifier(sigil)
        } else {
            scanner.punctuation()?
        };
        tokens.push(Token {
            kind,
            span: SourceSpan {
                start,
                end: scanner.location(),
            },
        });
    }
}

impl Scanner {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let current = self.peek(0)?;
        self.position += 1;
        if current == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(current)
    }

    fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, message: impl Into<String>) -> ScriptDescError {
        ScriptDescError::with_span(
            ErrorKind::Parse,
            message,
            SourceSpan::at(self.line, self.column),
        )
    }

    fn skip_trivia(&mut self) -> Result<(), ScriptDescError> {
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(current), _) if current.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(current) = self.bump() {
                        if current == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let opened = self.error("Unterminated block comment.");
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(0), self.peek(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => return Err(opened),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn integer(&mut self) -> Result<TokenKind, ScriptDescError> {
        let start = SourceSpan::at(self.line, self.column);
        let radix = if self.peek(0) == Some('0') && matches!(self.peek(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            16
        } else {
            10
        };
        let mut digits = String::new();
        while let Some(current) = self.peek(0) {
            if current.is_digit(radix) {
                digits.push(current);
                self.bump();
            } else if current.is_ascii_alphanumeric() || current == '_' {
                return Err(self.error(format!("Invalid digit '{}' in number literal.", current)));
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(self.error("Hexadecimal literal has no digits."));
        }
        i64::from_str_radix(&digits, radix)
            .map(TokenKind::Integer)
            .map_err(|_| {
                ScriptDescError::with_span(
                    ErrorKind::Parse,
                    format!("Number literal '{}' does not fit in 64 bits.", digits),
                    start,
                )
            })
    }

    fn string(&mut self) -> Result<TokenKind, ScriptDescError> {
        let opened = self.error("Unterminated string literal.");
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(TokenKind::Str(value)),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(escaped) => value.push(escaped),
                    None => return Err(opened),
                },
                Some(current) => value.push(current),
                None => return Err(opened),
            }
        }
    }

    /// Length of the variable sigil at the cursor when an identifier starts
    /// here, `Some(0)` for a plain identifier.
    fn identifier_sigil(&self) -> Option<usize> {
        let is_start = |offset: usize| {
            self.peek(offset)
                .is_some_and(|current| current.is_ascii_alphabetic() || current == '_')
        };
        let sigil = match (self.peek(0), self.peek(1)) {
            (Some('.'), Some('@')) | (Some('$'), Some('@')) | (Some('#'), Some('#')) => 2,
            (Some('.' | '@' | '$' | '\'' | '#'), _) => 1,
            _ => 0,
        };
        if is_start(sigil) {
            Some(sigil)
        } else {
            None
        }
    }

    fn identifier(&mut self, sigil: usize) -> TokenKind {
        let mut name = String::new();
        for _ in 0..sigil {
            if let Some(current) = self.bump() {
                name.push(current);
            }
        }
        while let Some(current) = self.peek(0) {
            if current.is_ascii_alphanumeric() || current == '_' {
                name.push(current);
                self.bump();
            } else {
                break;
            }
        }
        if self.peek(0) == Some('$') {
            name.push('$');
            self.bump();
        }
        TokenKind::Identifier(name)
    }

    fn punctuation(&mut self) -> Result<TokenKind, ScriptDescError> {
        for symbol in PUNCTUATION {
            let matched = symbol
                .chars()
                .enumerate()
                .all(|(offset, expected)| self.peek(offset) == Some(expected));
            if matched {
                for _ in 0..symbol.len() {
                    self.bump();
                }
                return Ok(TokenKind::Punct(symbol));
            }
        }
        let unexpected = self.peek(0).unwrap_or(' ');
        Err(self.error(format!("Unexpected character '{}'.", unexpected)))
    }
}

#[cfg(test)]
mod scanner_tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("source should tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn scans_sigil_variables_and_operators() {
        assert_eq!(
            kinds(".@i += 0x1F; @menu$ >= 'x"),
            vec![
                TokenKind::Identifier(".@i".to_string()),
                TokenKind::Punct("+="),
                TokenKind::Integer(31),
                TokenKind::Punct(";"),
                TokenKind::Identifier("@menu$".to_string()),
                TokenKind::Punct(">="),
                TokenKind::Identifier("'x".to_string()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("$@a ##b #c $d .e"),
            vec![
                TokenKind::Identifier("$@a".to_string()),
                TokenKind::Identifier("##b".to_string()),
                TokenKind::Identifier("#c".to_string()),
                TokenKind::Identifier("$d".to_string()),
                TokenKind::Identifier(".e".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_comments_and_tracks_lines() {
        let tokens = tokenize("// note\n/* block\ncomment */ bonus").expect("tokenize");
        assert_eq!(tokens[0].kind, TokenKind::Identifier("bonus".to_string()));
        assert_eq!(tokens[0].span.start, SourceLocation { line: 3, column: 12 });
    }

    #[test]
    fn decodes_string_escapes() {
        assert_eq!(
            kinds(r#""say \"hi\"\\""#),
            vec![TokenKind::Str("say \"hi\"\\".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn reports_lexical_errors_with_location() {
        let error = tokenize("bonus\n  \"open").expect_err("unterminated string");
        assert_eq!(error.kind, ErrorKind::Parse);
        assert_eq!(error.span, Some(SourceSpan::at(2, 3)));

        assert!(tokenize("12abc").is_err());
        assert!(tokenize("0x").is_err());
        assert!(tokenize("a ` b").is_err());
        assert!(tokenize("/* never closed").is_err());
    }
}
