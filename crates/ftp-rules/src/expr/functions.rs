//! Built-in functions callable from conditions.
//!
//! The table is fixed; there is no way for a rule file to define or import
//! anything else.

use std::cmp::Ordering;

use ftp_core::Value;
use ftp_core::value::parse_temporal;

use super::eval::{date_from_str, ordering};
use crate::errors::{ExprError, ExprResult};

/// Names accepted by [`call`].
pub const FUNCTIONS: &[&str] = &[
    "abs",
    "contains",
    "date",
    "endswith",
    "float",
    "int",
    "isna",
    "isnull",
    "len",
    "lower",
    "max",
    "min",
    "notna",
    "notnull",
    "round",
    "startswith",
    "str",
    "strip",
    "to_datetime",
    "upper",
];

/// Call a built-in by name.
pub fn call(name: &str, args: &[Value]) -> ExprResult<Value> {
    match name {
        "abs" => abs(one(name, args)?),
        "len" => len(one(name, args)?),
        "lower" => map_str(name, one(name, args)?, str::to_lowercase),
        "upper" => map_str(name, one(name, args)?, str::to_uppercase),
        "strip" => map_str(name, one(name, args)?, |s| s.trim().to_string()),
        "str" => Ok(Value::Str(one(name, args)?.to_string())),
        "int" => to_int(one(name, args)?),
        "float" => to_float(one(name, args)?),
        "round" => round(name, args),
        "min" => extreme(name, args, Ordering::Less),
        "max" => extreme(name, args, Ordering::Greater),
        "isnull" | "isna" => Ok(Value::Bool(one(name, args)?.is_missing())),
        "notnull" | "notna" => Ok(Value::Bool(!one(name, args)?.is_missing())),
        "date" => to_date(one(name, args)?),
        "to_datetime" => to_datetime(one(name, args)?),
        "startswith" => text_test(name, args, |s, p| s.starts_with(p)),
        "endswith" => text_test(name, args, |s, p| s.ends_with(p)),
        "contains" => text_test(name, args, |s, p| s.contains(p)),
        _ => Err(ExprError::eval(format!("unknown function '{name}'"))),
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> ExprResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ExprError::eval(format!(
            "{name}() takes {expected} argument{} ({} given)",
            if expected == 1 { "" } else { "s" },
            args.len()
        )))
    }
}

fn one<'a>(name: &str, args: &'a [Value]) -> ExprResult<&'a Value> {
    arity(name, args, 1)?;
    Ok(&args[0])
}

fn type_error(name: &str, value: &Value) -> ExprError {
    ExprError::eval(format!(
        "{name}() does not accept {}",
        value.kind_name()
    ))
}

fn abs(value: &Value) -> ExprResult<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Int(i) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| ExprError::eval("integer overflow")),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(type_error("abs", other)),
    }
}

fn len(value: &Value) -> ExprResult<Value> {
    let n = match value {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        other => {
            return Err(ExprError::eval(format!(
                "object of type {} has no len()",
                other.kind_name()
            )));
        }
    };
    i64::try_from(n)
        .map(Value::Int)
        .map_err(|_| ExprError::eval("length too large"))
}

fn map_str(name: &str, value: &Value, f: impl Fn(&str) -> String) -> ExprResult<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Str(s) => Ok(Value::Str(f(s))),
        other => Err(type_error(name, other)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_int(f: f64) -> ExprResult<i64> {
    if !f.is_finite() {
        return Err(ExprError::eval(format!(
            "cannot convert float {} to integer",
            ftp_core::value::format_float(f)
        )));
    }
    let truncated = f.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(ExprError::eval("integer overflow"));
    }
    Ok(truncated as i64)
}

fn to_int(value: &Value) -> ExprResult<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => float_to_int(*f).map(Value::Int),
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            ExprError::eval(format!("invalid literal for int(): '{s}'"))
        }),
        other => Err(type_error("int", other)),
    }
}

fn to_float(value: &Value) -> ExprResult<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            ExprError::eval(format!("could not convert string to float: '{s}'"))
        }),
        other => other
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| type_error("float", other)),
    }
}

/// `round(v)` rounds half to even and yields an int; `round(v, n)` keeps
/// the input kind.
fn round(name: &str, args: &[Value]) -> ExprResult<Value> {
    let (value, digits) = match args {
        [value] => (value, None),
        [value, Value::Int(n)] => (value, Some(*n)),
        [_, other] => {
            return Err(ExprError::eval(format!(
                "round() digits must be an integer, not {}",
                other.kind_name()
            )));
        }
        _ => {
            return Err(ExprError::eval(format!(
                "{name}() takes 1 or 2 arguments ({} given)",
                args.len()
            )));
        }
    };

    match (value, digits) {
        (Value::Null, _) => Ok(Value::Null),
        (Value::Bool(b), None) => Ok(Value::Int(i64::from(*b))),
        (Value::Int(i), None) => Ok(Value::Int(*i)),
        (Value::Int(i), Some(n)) if n >= 0 => Ok(Value::Int(*i)),
        (Value::Float(f), None) => float_to_int(f.round_ties_even()).map(Value::Int),
        (v, Some(n)) if v.is_numeric() => {
            let f = v.as_f64().unwrap_or(0.0);
            let exponent = i32::try_from(n.clamp(-308, 308)).unwrap_or(0);
            let rounded = if exponent >= 0 {
                let scale = 10_f64.powi(exponent);
                (f * scale).round_ties_even() / scale
            } else {
                let scale = 10_f64.powi(-exponent);
                (f / scale).round_ties_even() * scale
            };
            if matches!(v, Value::Float(_)) {
                Ok(Value::Float(rounded))
            } else {
                float_to_int(rounded).map(Value::Int)
            }
        }
        (other, _) => Err(type_error(name, other)),
    }
}

/// `min`/`max` over the arguments, or over a single list argument.
/// Nulls are skipped; all-null input yields null.
fn extreme(name: &str, args: &[Value], keep: Ordering) -> ExprResult<Value> {
    let items: &[Value] = match args {
        [Value::List(items)] => items,
        [] => {
            return Err(ExprError::eval(format!(
                "{name}() expected at least 1 argument"
            )));
        }
        _ => args,
    };

    let mut best: Option<&Value> = None;
    for item in items.iter().filter(|v| !v.is_missing()) {
        best = match best {
            None => Some(item),
            Some(current) => {
                if ordering(name, item, current)? == Some(keep) {
                    Some(item)
                } else {
                    Some(current)
                }
            }
        };
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

fn to_date(value: &Value) -> ExprResult<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::DateTime(dt) => Ok(Value::Date(dt.date())),
        Value::Str(s) => date_from_str(s)
            .map(Value::Date)
            .ok_or_else(|| ExprError::eval(format!("invalid date '{s}'"))),
        other => Err(type_error("date", other)),
    }
}

fn to_datetime(value: &Value) -> ExprResult<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Date(_) | Value::DateTime(_) => Ok(value.clone()),
        Value::Str(s) => parse_temporal(s)
            .ok_or_else(|| ExprError::eval(format!("invalid datetime '{s}'"))),
        other => Err(type_error("to_datetime", other)),
    }
}

/// Two-string predicates; a missing subject is simply false.
fn text_test(name: &str, args: &[Value], test: impl Fn(&str, &str) -> bool) -> ExprResult<Value> {
    arity(name, args, 2)?;
    match (&args[0], &args[1]) {
        (Value::Null, _) => Ok(Value::Bool(false)),
        (Value::Str(s), Value::Str(p)) => Ok(Value::Bool(test(s, p))),
        (Value::Str(_), other) | (other, _) => Err(type_error(name, other)),
    }
}
