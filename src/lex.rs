use std::fmt::Display;

use miette::{NamedSource, SourceSpan};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of `literal` in the whole input.
    pub offset: usize,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.literal.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Eof,
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Comma,
    Ident,
    Number(f64),
    /// A character (or a lone `.`) that no scanning rule accepts. The lexer
    /// never fails on its own; the parser rejects this token where it shows up.
    Invalid,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Eof => write!(f, "EOF  null"),
            TokenKind::Plus => write!(f, "PLUS {lit} null"),
            TokenKind::Minus => write!(f, "MINUS {lit} null"),
            TokenKind::Star => write!(f, "STAR {lit} null"),
            TokenKind::Slash => write!(f, "SLASH {lit} null"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::Comma => write!(f, "COMMA {lit} null"),
            TokenKind::Ident => write!(f, "IDENTIFIER {lit} null"),
            TokenKind::Number(n) => {
                if n.is_finite() && n == n.trunc() {
                    write!(f, "NUMBER {lit} {n}.0")
                } else {
                    write!(f, "NUMBER {lit} {n}")
                }
            }
            TokenKind::Invalid => write!(f, "INVALID {lit} null"),
        }
    }
}

/// Cursor over the tokens of an expression.
///
/// The current token is always materialized: it is scanned on construction and
/// again on every [`Lexer::advance`]. Once the input is exhausted the current
/// token stays [`TokenKind::Eof`] no matter how often `advance` is called.
pub struct Lexer<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    rest: &'de str,
    byte: usize,
    current: Token<'de>,
}

impl<'de> Lexer<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        let mut lexer = Lexer {
            filename,
            whole: input,
            rest: input,
            byte: 0,
            current: Token {
                kind: TokenKind::Eof,
                literal: "",
                offset: 0,
            },
        };
        lexer.advance();
        lexer
    }

    pub fn token(&self) -> Token<'de> {
        self.current
    }

    pub fn kind(&self) -> TokenKind {
        self.current.kind
    }

    pub fn number(&self) -> Option<f64> {
        match self.current.kind {
            TokenKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn identifier(&self) -> Option<&'de str> {
        match self.current.kind {
            TokenKind::Ident => Some(self.current.literal),
            _ => None,
        }
    }

    /// The input as a diagnostic source, named after the file it came from.
    pub fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string())
    }

    pub fn advance(&mut self) {
        self.current = self.scan();
    }

    fn scan(&mut self) -> Token<'de> {
        let trimmed = self.rest.trim_start();
        self.byte += self.rest.len() - trimmed.len();
        self.rest = trimmed;

        let Some(c) = self.rest.chars().next() else {
            return Token {
                kind: TokenKind::Eof,
                literal: "",
                offset: self.byte,
            };
        };

        enum Start {
            Ident,
            Number,
        }

        let started = match c {
            '+' => return self.take(TokenKind::Plus, 1),
            '-' => return self.take(TokenKind::Minus, 1),
            '*' => return self.take(TokenKind::Star, 1),
            '/' => return self.take(TokenKind::Slash, 1),
            '(' => return self.take(TokenKind::LeftParen, 1),
            ')' => return self.take(TokenKind::RightParen, 1),
            ',' => return self.take(TokenKind::Comma, 1),
            'a'..='z' | 'A'..='Z' | '_' => Start::Ident,
            '0'..='9' | '.' => Start::Number,
            c => return self.take(TokenKind::Invalid, c.len_utf8()),
        };

        match started {
            Start::Ident => {
                let first_non_ident = self
                    .rest
                    .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_'))
                    .unwrap_or(self.rest.len());
                self.take(TokenKind::Ident, first_non_ident)
            }
            Start::Number => {
                let len = number_len(self.rest);
                // `.` on its own is the only accepted shape that is not a float
                match self.rest[..len].parse() {
                    Ok(n) => self.take(TokenKind::Number(n), len),
                    Err(_) => self.take(TokenKind::Invalid, len),
                }
            }
        }
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> Token<'de> {
        let token = Token {
            kind,
            literal: &self.rest[..len],
            offset: self.byte,
        };
        self.rest = &self.rest[len..];
        self.byte += len;
        token
    }
}

/// Byte length of the numeric literal at the start of `input`: digits with at
/// most one `.`, then an exponent only when the `e`/`E` directly follows a digit
/// and is itself followed by digits (optionally after one sign). Otherwise the
/// marker is left for the identifier rule and a sign stays a binary operator.
fn number_len(input: &str) -> usize {
    let bytes = input.as_bytes();
    let mut end = 0;
    let mut dotted = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => end += 1,
            b'.' if !dotted => {
                dotted = true;
                end += 1;
            }
            _ => break,
        }
    }

    let after_digit = end > 0 && bytes[end - 1].is_ascii_digit();
    if after_digit && matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let digits = bytes[exponent..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 {
            end = exponent + digits;
        }
    }
    end
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Token<'de>;

    /// Yields every token up to, but not including, the end of input.
    fn next(&mut self) -> Option<Self::Item> {
        let token = self.current;
        if token.kind == TokenKind::Eof {
            return None;
        }
        self.advance();
        Some(token)
    }
}
