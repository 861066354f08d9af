//! Dynamic configuration values and type coercion

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a configuration item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[serde(alias = "string")]
    Str,
    #[serde(alias = "integer")]
    Int,
    Float,
    #[serde(alias = "boolean")]
    Bool,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Str => "string",
            ItemType::Int => "integer",
            ItemType::Float => "float",
            ItemType::Bool => "boolean",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration value, either raw (as read from a source) or coerced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value counts as "set" for required-item validation.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Convert this value to `ty` on behalf of `item`.
    ///
    /// Returns `Ok(None)` when the value does not count as supplied: a null, or an
    /// empty string for any non-string type.
    pub fn coerce(self, item: &str, ty: ItemType) -> Result<Option<Value>> {
        let mismatch = |value: &Value| ConfigError::TypeCoercion {
            item: item.to_string(),
            value: value.to_string(),
            expected: ty.as_str(),
        };

        let coerced = match (ty, self) {
            (_, Value::Null) => return Ok(None),
            (ItemType::Str, Value::Str(s)) => Value::Str(s),
            (_, Value::Str(s)) if s.is_empty() => return Ok(None),
            (ItemType::Str, other) => Value::Str(other.to_string()),

            (ItemType::Int, Value::Int(i)) => Value::Int(i),
            (ItemType::Int, Value::Str(s)) => match s.trim().parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => return Err(mismatch(&Value::Str(s))),
            },

            (ItemType::Float, Value::Float(f)) => Value::Float(f),
            (ItemType::Float, Value::Int(i)) => Value::Float(i as f64),
            (ItemType::Float, Value::Str(s)) => match s.trim().parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => return Err(mismatch(&Value::Str(s))),
            },

            (ItemType::Bool, Value::Bool(b)) => Value::Bool(b),
            (ItemType::Bool, Value::Str(s)) => match parse_bool(&s) {
                Some(b) => Value::Bool(b),
                None => return Err(mismatch(&Value::Str(s))),
            },

            (_, other) => return Err(mismatch(&other)),
        };

        Ok(Some(coerced))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("none"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
