//! Sandboxed rule-condition language.
//!
//! Conditions are small boolean expressions over a row's columns:
//!
//! ```text
//! x < 0
//! rate > 0.05 and desk in ['ALM', 'Treasury']
//! pd.isnull(x) or row["Curve Date"] < '2024-01-01'
//! 0 < spread_bps <= 500
//! ```
//!
//! A condition is compiled once with [`Expression::parse`] and evaluated per
//! row with [`Expression::evaluate`]. Only the operators and the fixed table in
//! [`functions`] are available; nothing in a rule file can reach the host.

pub mod ast;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;

use std::fmt;
use std::str::FromStr;

use ftp_core::Value;

pub use eval::{Bindings, TARGET_NAME};
pub use parser::MAX_DEPTH;

use crate::errors::{ExprError, ExprResult};
use ast::Expr;
use parser::Parser;

/// A compiled condition.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    /// Compile condition text.
    pub fn parse(source: &str) -> ExprResult<Self> {
        Ok(Self {
            source: source.to_string(),
            root: Parser::parse(source)?,
        })
    }

    /// The original condition text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The syntax tree.
    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Evaluate to a value.
    pub fn evaluate(&self, bindings: &Bindings<'_>) -> ExprResult<Value> {
        eval::evaluate(&self.root, bindings)
    }

    /// Evaluate and take the truthiness of the result.
    pub fn matches(&self, bindings: &Bindings<'_>) -> ExprResult<bool> {
        self.evaluate(bindings).map(|v| v.is_truthy())
    }
}

impl FromStr for Expression {
    type Err = ExprError;

    fn from_str(s: &str) -> ExprResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
