//! Evaluator: walks a parsed condition against one row.
//!
//! Missing values follow spreadsheet intuition rather than raising:
//! ordering against null is false, arithmetic with null yields null.
//! Everything else that cannot be computed is an [`ExprError::Eval`].

use std::cmp::Ordering;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use ftp_core::Row;
use ftp_core::Value;
use ftp_core::value::parse_temporal;

use super::ast::{ArithOp, CompareOp, Expr, SignOp};
use super::functions;
use crate::errors::{ExprError, ExprResult};

/// Name bound to the rule's target column.
pub const TARGET_NAME: &str = "x";

/// Values visible to a condition: the row's columns plus `x`.
#[derive(Clone, Copy, Debug)]
pub struct Bindings<'a> {
    row: &'a Row,
    target: Option<&'a Value>,
}

impl<'a> Bindings<'a> {
    /// Bind a row, with `x` aliasing `row[target_column]` when given.
    pub fn new(row: &'a Row, target_column: Option<&str>) -> Self {
        Self {
            row,
            target: target_column.and_then(|c| row.get(c)),
        }
    }

    fn lookup(&self, name: &str) -> ExprResult<Value> {
        if name == TARGET_NAME {
            return Ok(self.target.cloned().unwrap_or(Value::Null));
        }
        self.row
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::eval(format!("name '{name}' is not defined")))
    }

    fn column(&self, name: &Value) -> ExprResult<Value> {
        let Value::Str(name) = name else {
            return Err(ExprError::eval(format!(
                "row[...] needs a column name string, got {}",
                name.kind_name()
            )));
        };
        self.row
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::eval(format!("column '{name}' not found in row")))
    }
}

/// Evaluate `expr` against `bindings`.
pub fn evaluate(expr: &Expr, bindings: &Bindings<'_>) -> ExprResult<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::List(items) => items
            .iter()
            .map(|item| evaluate(item, bindings))
            .collect::<ExprResult<Vec<_>>>()
            .map(Value::List),
        Expr::Name(name) => bindings.lookup(name),
        Expr::Column(name) => bindings.column(&evaluate(name, bindings)?),
        Expr::Sign(op, operand) => sign(*op, evaluate(operand, bindings)?),
        Expr::Not(operand) => Ok(Value::Bool(!evaluate(operand, bindings)?.is_truthy())),
        Expr::And(left, right) => {
            if !evaluate(left, bindings)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(evaluate(right, bindings)?.is_truthy()))
        }
        Expr::Or(left, right) => {
            if evaluate(left, bindings)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(evaluate(right, bindings)?.is_truthy()))
        }
        Expr::Arith(op, left, right) => {
            arithmetic(*op, &evaluate(left, bindings)?, &evaluate(right, bindings)?)
        }
        Expr::Compare { first, rest } => {
            let mut left = evaluate(first, bindings)?;
            for (op, right_expr) in rest {
                let right = evaluate(right_expr, bindings)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| evaluate(arg, bindings))
                .collect::<ExprResult<Vec<_>>>()?;
            functions::call(function, &values)
        }
        Expr::Index(target, index) => {
            subscript(&evaluate(target, bindings)?, &evaluate(index, bindings)?)
        }
    }
}

// ── Comparison ──────────────────────────────────────────────────────────────

/// Apply one comparison operator.
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> ExprResult<bool> {
    match op {
        CompareOp::Eq => Ok(equals(left, right)),
        CompareOp::NotEq => Ok(!equals(left, right)),
        CompareOp::Lt => ordered(op, left, right, Ordering::is_lt),
        CompareOp::Le => ordered(op, left, right, Ordering::is_le),
        CompareOp::Gt => ordered(op, left, right, Ordering::is_gt),
        CompareOp::Ge => ordered(op, left, right, Ordering::is_ge),
        CompareOp::In => contains(right, left),
        CompareOp::NotIn => contains(right, left).map(|found| !found),
        CompareOp::Is => Ok(identical(left, right)),
        CompareOp::IsNot => Ok(!identical(left, right)),
    }
}

/// Equality that never fails; values of unrelated kinds are unequal.
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equals(x, y))
        }
        (a, b) if a.is_numeric() && b.is_numeric() => numeric_cmp(a, b) == Some(Ordering::Equal),
        (a, b) => match (as_datetime(a), as_datetime(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// `is`: null and booleans compare by identity; other kinds by same-kind equality.
fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null | Value::Bool(_), _) | (_, Value::Null | Value::Bool(_)) => false,
        (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b) && equals(a, b),
    }
}

fn ordered(
    op: CompareOp,
    left: &Value,
    right: &Value,
    accept: fn(Ordering) -> bool,
) -> ExprResult<bool> {
    if left.is_missing() || right.is_missing() {
        return Ok(false);
    }
    Ok(ordering(op.symbol(), left, right)?.is_some_and(accept))
}

/// Total-or-partial ordering between two present values.
///
/// `None` means the values are comparable in kind but unordered.
pub(crate) fn ordering(symbol: &str, left: &Value, right: &Value) -> ExprResult<Option<Ordering>> {
    match (left, right) {
        (a, b) if a.is_numeric() && b.is_numeric() => Ok(numeric_cmp(a, b)),
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Str(s), t) if is_temporal(t) => {
            let parsed = temporal_from_str(s, t)?;
            ordering(symbol, &parsed, t)
        }
        (t, Value::Str(s)) if is_temporal(t) => {
            let parsed = temporal_from_str(s, t)?;
            ordering(symbol, t, &parsed)
        }
        (a, b) => match (as_datetime(a), as_datetime(b)) {
            (Some(x), Some(y)) => Ok(Some(x.cmp(&y))),
            _ => Err(ExprError::eval(format!(
                "'{symbol}' not supported between {} and {}",
                left.kind_name(),
                right.kind_name()
            ))),
        },
    }
}

fn numeric_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn is_temporal(v: &Value) -> bool {
    matches!(v, Value::Date(_) | Value::DateTime(_))
}

fn temporal_from_str(text: &str, counterpart: &Value) -> ExprResult<Value> {
    parse_temporal(text).ok_or_else(|| {
        ExprError::eval(format!(
            "cannot compare {} with non-date string '{text}'",
            counterpart.kind_name()
        ))
    })
}

/// Dates compare with datetimes as midnight.
fn as_datetime(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::DateTime(dt) => Some(*dt),
        _ => None,
    }
}

/// `needle in haystack`.
fn contains(haystack: &Value, needle: &Value) -> ExprResult<bool> {
    match (haystack, needle) {
        (Value::Str(h), Value::Str(n)) => Ok(h.contains(n.as_str())),
        (Value::Str(_), other) => Err(ExprError::eval(format!(
            "'in <str>' needs a string on the left, got {}",
            other.kind_name()
        ))),
        (Value::List(items), n) => Ok(items.iter().any(|item| equals(item, n))),
        (other, _) => Err(ExprError::eval(format!(
            "'in' needs a string or list on the right, got {}",
            other.kind_name()
        ))),
    }
}

// ── Arithmetic ──────────────────────────────────────────────────────────────

fn sign(op: SignOp, value: Value) -> ExprResult<Value> {
    match (op, value) {
        (_, Value::Null) => Ok(Value::Null),
        (SignOp::Pos, v) if v.is_numeric() => Ok(promote_bool(v)),
        (SignOp::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| ExprError::eval("integer overflow")),
        (SignOp::Neg, Value::Bool(b)) => Ok(Value::Int(-i64::from(b))),
        (SignOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (op, v) => Err(ExprError::eval(format!(
            "bad operand type for unary {}: {}",
            if op == SignOp::Neg { "-" } else { "+" },
            v.kind_name()
        ))),
    }
}

fn promote_bool(v: Value) -> Value {
    match v {
        Value::Bool(b) => Value::Int(i64::from(b)),
        other => other,
    }
}

/// Apply one arithmetic operator.
pub fn arithmetic(op: ArithOp, left: &Value, right: &Value) -> ExprResult<Value> {
    if matches!(left, Value::Null) || matches!(right, Value::Null) {
        return Ok(Value::Null);
    }

    match (left, right) {
        (a, b) if a.is_numeric() && b.is_numeric() => numeric(op, a, b),
        (Value::Str(a), Value::Str(b)) if op == ArithOp::Add => Ok(Value::Str(format!("{a}{b}"))),
        (Value::List(a), Value::List(b)) if op == ArithOp::Add => {
            Ok(Value::List(a.iter().chain(b).cloned().collect()))
        }
        (Value::Date(a), Value::Date(b)) if op == ArithOp::Sub => {
            Ok(Value::Int((*a - *b).num_days()))
        }
        (a, b) if op == ArithOp::Sub && is_temporal(a) && is_temporal(b) => {
            let (Some(x), Some(y)) = (as_datetime(a), as_datetime(b)) else {
                return Err(unsupported(op, left, right));
            };
            #[allow(clippy::cast_precision_loss)]
            let days = (x - y).num_seconds() as f64 / 86_400.0;
            Ok(Value::Float(days))
        }
        (t, Value::Int(days)) if is_temporal(t) && matches!(op, ArithOp::Add | ArithOp::Sub) => {
            shift_days(t, if op == ArithOp::Add { *days } else { -*days })
                .ok_or_else(|| ExprError::eval("date out of range"))
        }
        _ => Err(unsupported(op, left, right)),
    }
}

fn unsupported(op: ArithOp, left: &Value, right: &Value) -> ExprError {
    ExprError::eval(format!(
        "unsupported operand types for {}: {} and {}",
        op.symbol(),
        left.kind_name(),
        right.kind_name()
    ))
}

fn shift_days(value: &Value, days: i64) -> Option<Value> {
    let delta = Duration::try_days(days)?;
    match value {
        Value::Date(d) => d.checked_add_signed(delta).map(Value::Date),
        Value::DateTime(dt) => dt.checked_add_signed(delta).map(Value::DateTime),
        _ => None,
    }
}

fn numeric(op: ArithOp, left: &Value, right: &Value) -> ExprResult<Value> {
    let ints = match (promote_bool(left.clone()), promote_bool(right.clone())) {
        (Value::Int(a), Value::Int(b)) => Some((a, b)),
        _ => None,
    };

    let int_result = match (ints, op) {
        (Some((a, b)), ArithOp::Add) => Some(a.checked_add(b)),
        (Some((a, b)), ArithOp::Sub) => Some(a.checked_sub(b)),
        (Some((a, b)), ArithOp::Mul) => Some(a.checked_mul(b)),
        (Some((a, b)), ArithOp::Mod) => {
            if b == 0 {
                return Err(ExprError::eval("integer modulo by zero"));
            }
            Some(
                a.checked_rem(b)
                    .map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r }),
            )
        }
        // `/` always yields a float
        _ => None,
    };
    if let Some(result) = int_result {
        return result
            .map(Value::Int)
            .ok_or_else(|| ExprError::eval("integer overflow"));
    }

    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(unsupported(op, left, right));
    };
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => {
            if b == 0.0 {
                return Err(ExprError::eval("division by zero"));
            }
            a / b
        }
        ArithOp::Mod => {
            if b == 0.0 {
                return Err(ExprError::eval("float modulo by zero"));
            }
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
        }
    };
    Ok(Value::Float(result))
}

// ── Subscripts ──────────────────────────────────────────────────────────────

fn subscript(target: &Value, index: &Value) -> ExprResult<Value> {
    let position = |len: usize| -> ExprResult<usize> {
        let Value::Int(i) = promote_bool(index.clone()) else {
            return Err(ExprError::eval(format!(
                "indices must be integers, not {}",
                index.kind_name()
            )));
        };
        let len_i = i64::try_from(len).map_err(|_| ExprError::eval("sequence too long"))?;
        let resolved = if i < 0 { i + len_i } else { i };
        usize::try_from(resolved)
            .ok()
            .filter(|p| *p < len)
            .ok_or_else(|| ExprError::eval("index out of range"))
    };

    match target {
        Value::List(items) => Ok(items[position(items.len())?].clone()),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(Value::Str(chars[position(chars.len())?].to_string()))
        }
        other => Err(ExprError::eval(format!(
            "{} is not subscriptable",
            other.kind_name()
        ))),
    }
}

/// Parse `YYYY-MM-DD` (or a datetime, keeping its date).
pub(crate) fn date_from_str(text: &str) -> Option<NaiveDate> {
    match parse_temporal(text)? {
        Value::Date(d) => Some(d),
        Value::DateTime(dt) => Some(dt.date()),
        _ => None,
    }
}
