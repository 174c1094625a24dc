//! Dataset cell values.
//!
//! A [`Value`] is the scalar stored under one column of one row. Datasets
//! arrive from loosely typed sources (spreadsheet exports, CSV, JSON), so the
//! model is deliberately small: null, booleans, 64-bit integers, floats,
//! strings and two temporal kinds. `List` only appears as an intermediate
//! result inside rule expressions.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value as Json;

/// ISO-8601 date format used for canonical string forms.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// ISO-8601 datetime format used for canonical string forms.
///
/// `%.f` prints nothing when the fractional part is zero.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Accepted datetime layouts when parsing text.
const DATETIME_PARSE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A single cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number (may be non-finite).
    Float(f64),
    /// Text.
    Str(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
    /// Ordered list (expression results only).
    List(Vec<Value>),
}

impl Value {
    /// Short type name used in evaluation error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
        }
    }

    /// Truthiness: null, `false`, zero, empty strings and empty lists are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Date(_) | Self::DateTime(_) => true,
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Whether this value counts as missing (null or NaN).
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of booleans, integers and floats.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Whether the value participates in arithmetic.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Int(_) | Self::Float(_))
    }

    /// JSON-safe snapshot of this value.
    ///
    /// Temporal values become ISO strings. Floats JSON cannot carry (NaN,
    /// infinities) become their string form. Never fails.
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or_else(|| Json::String(format_float(*f)), Json::Number),
            Self::Str(s) => Json::String(s.clone()),
            Self::Date(d) => Json::String(d.format(DATE_FORMAT).to_string()),
            Self::DateTime(dt) => Json::String(dt.format(DATETIME_FORMAT).to_string()),
            Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Convert a JSON value from a records file into a cell value.
    ///
    /// Nested arrays and objects are kept as their compact JSON text.
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Json::String(s) => Self::Str(s.clone()),
            Json::Array(_) | Json::Object(_) => Self::Str(json.to_string()),
        }
    }

    /// Type a raw text cell (CSV): empty → null, then bool, int, float,
    /// ISO date/datetime, falling back to a string.
    pub fn parse_cell(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            return Self::Null;
        }
        match text.to_ascii_lowercase().as_str() {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = text.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = text.parse::<f64>() {
            return Self::Float(f);
        }
        parse_temporal(text).unwrap_or_else(|| Self::Str(raw.to_string()))
    }
}

/// Parse an ISO date or datetime string.
pub fn parse_temporal(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(d) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Some(Value::Date(d));
    }
    DATETIME_PARSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(Value::DateTime)
}

/// Format a float the way an analyst expects to read it back
/// (`2.0`, `0.25`, `nan`, `inf`).
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{}", format_float(*v)),
            Self::Str(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        Self::Str(s) => write!(f, "'{s}'")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}
