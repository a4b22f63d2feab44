// src/extractors/value.rs
use serde::Serialize;

/// A report token after best-effort type coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value, used where a metric is derived arithmetically.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(token: &str) -> Self {
        coerce(token)
    }
}

/// Coerces a trimmed cell token.
///
/// Boolean literals win, then integers, then floats. Spaces (thousands
/// separators) and `%` are removed before numeric parsing. Anything else is
/// kept as the original text.
pub fn coerce(token: &str) -> Value {
    if token.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    let cleaned: String = token.chars().filter(|c| *c != ' ' && *c != '%').collect();

    if let Ok(i) = cleaned.parse::<i64>() {
        return Value::Int(i);
    }
    match cleaned.parse::<f64>() {
        // inf/nan have no JSON form
        Ok(f) if f.is_finite() => Value::Float(f),
        _ => Value::Text(token.to_string()),
    }
}
