//! Condition syntax tree.

use ftp_core::Value;

/// Binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl ArithOp {
    /// Operator symbol, for error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}

/// Comparison operators. Chains of these form one [`Expr::Compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `in`
    In,
    /// `not in`
    NotIn,
    /// `is`
    Is,
    /// `is not`
    IsNot,
}

impl CompareOp {
    /// Operator symbol, for error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Is => "is",
            Self::IsNot => "is not",
        }
    }
}

/// Unary sign operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignOp {
    /// `-x`
    Neg,
    /// `+x`
    Pos,
}

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Value),
    /// `[a, b, ...]`
    List(Vec<Expr>),
    /// A bare name: a column, or `x`.
    Name(String),
    /// `row[<expr>]`: column lookup by computed name.
    Column(Box<Expr>),
    /// `-a` / `+a`
    Sign(SignOp, Box<Expr>),
    /// `not a`
    Not(Box<Expr>),
    /// `a and b`
    And(Box<Expr>, Box<Expr>),
    /// `a or b`
    Or(Box<Expr>, Box<Expr>),
    /// `a <op> b`
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    /// `a <op1> b <op2> c ...`
    Compare {
        /// Leftmost operand.
        first: Box<Expr>,
        /// Each following operator and operand.
        rest: Vec<(CompareOp, Expr)>,
    },
    /// `name(args...)`, including `pd.name(...)` and `recv.name(...)`.
    Call {
        /// Function name without any module prefix.
        function: String,
        /// Arguments; a method receiver comes first.
        args: Vec<Expr>,
    },
    /// `target[index]`
    Index(Box<Expr>, Box<Expr>),
}
