//! Parser: recursive descent over the lexer's tokens.
//!
//! Precedence, lowest first: `or`, `and`, `not`, comparisons (chained),
//! `+ -`, `* / %`, unary sign, postfix calls and subscripts, atoms.

use ftp_core::Value;

use super::ast::{ArithOp, CompareOp, Expr, SignOp};
use super::lexer::{Lexer, Token, TokenKind};
use crate::errors::{ExprError, ExprResult};

/// Maximum nesting depth of a condition.
///
/// Every parenthesis, prefix operator, binary operator and postfix call or
/// subscript adds a level, so `a + b + c` is two deep. This bounds the
/// height of the tree the evaluator walks.
pub const MAX_DEPTH: usize = 128;

/// Module prefixes accepted (and dropped) in front of function names.
const MODULE_PREFIXES: &[&str] = &["pd", "np"];

/// Parser for rule conditions.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Parse condition text into an expression tree.
    pub fn parse(input: &str) -> ExprResult<Expr> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Self {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_expr()?;
        if !parser.check(&TokenKind::Eof) {
            return Err(parser.unexpected());
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> ExprResult<Expr> {
        self.enter()?;
        let result = self.parse_or();
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> ExprResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            self.enter()?;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_and(&mut self) -> ExprResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_not()?;
        while self.eat(&TokenKind::And) {
            self.enter()?;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_not(&mut self) -> ExprResult<Expr> {
        if self.eat(&TokenKind::Not) {
            self.enter()?;
            let operand = self.parse_not();
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(operand?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ExprResult<Expr> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        while let Some(op) = self.comparison_op() {
            rest.push((op, self.parse_additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    /// Consume a comparison operator, including the two-word forms.
    fn comparison_op(&mut self) -> Option<CompareOp> {
        let op = match self.peek_kind() {
            TokenKind::EqEq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Le => CompareOp::Le,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::Ge => CompareOp::Ge,
            TokenKind::In => CompareOp::In,
            TokenKind::Is => {
                self.advance();
                return Some(if self.eat(&TokenKind::Not) {
                    CompareOp::IsNot
                } else {
                    CompareOp::Is
                });
            }
            TokenKind::Not if self.peek_kind_at(1) == &TokenKind::In => {
                self.advance();
                CompareOp::NotIn
            }
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_additive(&mut self) -> ExprResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ExprResult<Expr> {
        let base = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                TokenKind::Percent => ArithOp::Mod,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let right = self.parse_unary()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
        self.depth = base;
        Ok(left)
    }

    fn parse_unary(&mut self) -> ExprResult<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => SignOp::Neg,
            TokenKind::Plus => SignOp::Pos,
            _ => return self.parse_postfix(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        Ok(Expr::Sign(op, Box::new(operand?)))
    }

    fn parse_postfix(&mut self) -> ExprResult<Expr> {
        let base = self.depth;
        let mut expr = self.parse_atom()?;
        loop {
            if matches!(
                self.peek_kind(),
                TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot
            ) {
                self.enter()?;
            }
            match self.peek_kind() {
                TokenKind::LParen => {
                    let Expr::Name(function) = expr else {
                        return Err(self.error("only named functions can be called"));
                    };
                    self.advance();
                    let args = self.parse_args()?;
                    expr = Expr::Call { function, args };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = match expr {
                        Expr::Name(name) if name == "row" => Expr::Column(Box::new(index)),
                        target => Expr::Index(Box::new(target), Box::new(index)),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let function = self.expect_ident()?;
                    if !self.check(&TokenKind::LParen) {
                        return Err(self.error(format!(
                            "attribute access '.{function}' is not supported; only calls are"
                        )));
                    }
                    self.advance();
                    let mut args = self.parse_args()?;
                    match expr {
                        Expr::Name(module) if MODULE_PREFIXES.contains(&module.as_str()) => {}
                        receiver => args.insert(0, receiver),
                    }
                    expr = Expr::Call { function, args };
                }
                _ => break,
            }
        }
        self.depth = base;
        Ok(expr)
    }

    /// Parse call arguments after the opening parenthesis.
    fn parse_args(&mut self) -> ExprResult<Vec<Expr>> {
        self.parse_sequence(&TokenKind::RParen)
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed.
    fn parse_sequence(&mut self, close: &TokenKind) -> ExprResult<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.check(close) {
            items.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn parse_atom(&mut self) -> ExprResult<Expr> {
        let token = self.peek().clone();
        let expr = match token.kind {
            TokenKind::Int(i) => Expr::Literal(Value::Int(i)),
            TokenKind::Float(f) => Expr::Literal(Value::Float(f)),
            TokenKind::Str(s) => Expr::Literal(Value::Str(s)),
            TokenKind::True => Expr::Literal(Value::Bool(true)),
            TokenKind::False => Expr::Literal(Value::Bool(false)),
            TokenKind::None => Expr::Literal(Value::Null),
            TokenKind::Ident(name) => Expr::Name(name),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => {
                self.advance();
                self.enter()?;
                let items = self.parse_sequence(&TokenKind::RBracket);
                self.depth -= 1;
                return Ok(Expr::List(items?));
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(expr)
    }

    // ── Token helpers ───────────────────────────────────────────────

    fn enter(&mut self) -> ExprResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(format!(
                "expression is nested more than {MAX_DEPTH} levels deep"
            )));
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        // tokenize always ends with Eof, and advance never moves past it
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_kind_at(&self, ahead: usize) -> &TokenKind {
        let index = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> ExprResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{kind}' but found {}", self.found())))
        }
    }

    fn expect_ident(&mut self) -> ExprResult<String> {
        if let TokenKind::Ident(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error(format!("expected a name but found {}", self.found())))
        }
    }

    fn found(&self) -> String {
        match self.peek_kind() {
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{other}'"),
        }
    }

    fn unexpected(&self) -> ExprError {
        self.error(format!("unexpected {}", self.found()))
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError::Parse {
            offset: self.peek().offset,
            message: message.into(),
        }
    }
}
