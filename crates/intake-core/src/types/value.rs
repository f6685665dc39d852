//! Literal values carried by conditional-logic predicates
//!
//! Predicates compare a patient's answer against one of these literals. The set
//! is intentionally small: what an authoring tool can express in a form builder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicate literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64, handles both int and float)
    Number(f64),
    /// String value (option identifier or free text)
    String(String),
    /// List of values (multi-select comparisons)
    Array(Vec<Value>),
}

impl Value {
    /// Numeric view of the value, parsing strings that hold a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Textual view of a scalar value, used when matching option identifiers
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) => None,
        }
    }

    /// Flatten into the list of scalar texts (an array yields each element)
    pub fn texts(&self) -> Vec<String> {
        match self {
            Value::Array(items) => items.iter().filter_map(Value::as_text).collect(),
            other => other.as_text().into_iter().collect(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}
