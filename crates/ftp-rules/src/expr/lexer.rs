//! Lexer: tokenizes a rule condition.
//!
//! Offsets are character (not byte) positions so error messages line up
//! with what an analyst sees in the rule file.

use std::fmt;

use crate::errors::{ExprError, ExprResult};

/// A token produced by the lexer.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The kind of token, with its literal payload.
    pub kind: TokenKind,
    /// Character offset of the first character.
    pub offset: usize,
}

/// Token types.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals and names
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    // Keywords
    And,
    Or,
    Not,
    In,
    Is,
    True,
    False,
    None,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    // Structural
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,

    // End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
            Self::In => write!(f, "in"),
            Self::Is => write!(f, "is"),
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::None => write!(f, "None"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::EqEq => write!(f, "=="),
            Self::NotEq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Comma => write!(f, ","),
            Self::Dot => write!(f, "."),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Lexer for rule conditions.
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    /// Create a new lexer from condition text.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> ExprResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.pos >= self.input.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    offset: self.pos,
                });
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> ExprResult<Token> {
        let offset = self.pos;
        let ch = self.input[self.pos];

        let simple = |kind: TokenKind, width: usize, lexer: &mut Self| -> ExprResult<Token> {
            lexer.pos += width;
            Ok(Token { kind, offset })
        };

        match ch {
            '(' => simple(TokenKind::LParen, 1, self),
            ')' => simple(TokenKind::RParen, 1, self),
            '[' => simple(TokenKind::LBracket, 1, self),
            ']' => simple(TokenKind::RBracket, 1, self),
            ',' => simple(TokenKind::Comma, 1, self),
            '+' => simple(TokenKind::Plus, 1, self),
            '-' => simple(TokenKind::Minus, 1, self),
            '*' => simple(TokenKind::Star, 1, self),
            '/' => simple(TokenKind::Slash, 1, self),
            '%' => simple(TokenKind::Percent, 1, self),
            '=' if self.peek_at(1) == Some('=') => simple(TokenKind::EqEq, 2, self),
            '!' if self.peek_at(1) == Some('=') => simple(TokenKind::NotEq, 2, self),
            '!' => simple(TokenKind::Not, 1, self),
            '<' if self.peek_at(1) == Some('=') => simple(TokenKind::Le, 2, self),
            '<' => simple(TokenKind::Lt, 1, self),
            '>' if self.peek_at(1) == Some('=') => simple(TokenKind::Ge, 2, self),
            '>' => simple(TokenKind::Gt, 1, self),
            '&' if self.peek_at(1) == Some('&') => simple(TokenKind::And, 2, self),
            '|' if self.peek_at(1) == Some('|') => simple(TokenKind::Or, 2, self),
            '\'' | '"' => self.read_string(ch),
            '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            '.' => simple(TokenKind::Dot, 1, self),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_word()),
            '=' => Err(self.error(offset, "'=' is assignment; use '==' to compare")),
            other => Err(self.error(offset, format!("unexpected character '{other}'"))),
        }
    }

    fn read_string(&mut self, quote: char) -> ExprResult<Token> {
        let offset = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            let Some(ch) = self.input.get(self.pos).copied() else {
                return Err(self.error(offset, "unterminated string literal"));
            };
            self.pos += 1;
            match ch {
                c if c == quote => break,
                '\\' => {
                    let Some(escaped) = self.input.get(self.pos).copied() else {
                        return Err(self.error(offset, "unterminated string literal"));
                    };
                    self.pos += 1;
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        '\\' | '\'' | '"' => value.push(escaped),
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                }
                c => value.push(c),
            }
        }

        Ok(Token {
            kind: TokenKind::Str(value),
            offset,
        })
    }

    fn read_number(&mut self) -> ExprResult<Token> {
        let offset = self.pos;
        let mut text = String::new();
        let mut is_float = false;

        self.take_digits(&mut text);
        let fraction_follows = self
            .peek_at(1)
            .is_none_or(|c| c.is_ascii_digit() || !c.is_alphabetic());
        if self.peek_at(0) == Some('.') && fraction_follows {
            is_float = true;
            text.push('.');
            self.pos += 1;
            self.take_digits(&mut text);
        }
        if matches!(self.peek_at(0), Some('e' | 'E')) {
            let sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                text.push('e');
                if sign {
                    text.push(self.input[self.pos + 1]);
                }
                self.pos += digit_at;
                self.take_digits(&mut text);
            }
        }

        if self.peek_at(0).is_some_and(|c| c.is_alphanumeric() || c == '_') {
            return Err(self.error(self.pos, "invalid number literal"));
        }

        let kind = if is_float {
            let v: f64 = text
                .parse()
                .map_err(|_| self.error(offset, format!("invalid number literal '{text}'")))?;
            TokenKind::Float(v)
        } else {
            let v: i64 = text
                .parse()
                .map_err(|_| self.error(offset, format!("integer literal '{text}' is too large")))?;
            TokenKind::Int(v)
        };

        Ok(Token { kind, offset })
    }

    fn read_word(&mut self) -> Token {
        let offset = self.pos;
        let mut word = String::new();
        while let Some(c) = self.peek_at(0) {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        let kind = match word.as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "in" => TokenKind::In,
            "is" => TokenKind::Is,
            "True" | "true" => TokenKind::True,
            "False" | "false" => TokenKind::False,
            "None" | "null" => TokenKind::None,
            _ => TokenKind::Ident(word),
        };
        Token { kind, offset }
    }

    fn take_digits(&mut self, into: &mut String) {
        while let Some(c) = self.peek_at(0) {
            if c.is_ascii_digit() {
                into.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_at(0).is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.input.get(self.pos + ahead).copied()
    }

    #[allow(clippy::unused_self)]
    fn error(&self, offset: usize, message: impl Into<String>) -> ExprError {
        ExprError::Lex {
            offset,
            message: message.into(),
        }
    }
}
