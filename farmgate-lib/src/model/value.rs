//! Value enum for dynamic field values

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// A dynamic value held by a [`Record`](super::Record) field.
///
/// # Type Mapping
///
/// | JSON                         | Rust Variant |
/// |------------------------------|--------------|
/// | `null`                       | `Null`       |
/// | `true` / `false`             | `Bool`       |
/// | integer                      | `Int`        |
/// | fractional number            | `Float`      |
/// | RFC 3339 string              | `DateTime`   |
/// | other string                 | `String`     |
/// | array                        | `List`       |
/// | object                       | `Object`     |
///
/// `Decimal` never comes off the wire; it is produced by callers that set
/// monetary amounts explicitly.
///
/// # Example
///
/// ```
/// use farmgate_lib::model::Value;
///
/// let name = Value::from("Smoked salmon");
/// let qty = Value::from(12i64);
/// let empty = Value::Null;
/// assert!(empty.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// String value.
    String(String),
    /// Date and time (UTC).
    DateTime(DateTime<Utc>),
    /// Array of values.
    List(Vec<Value>),
    /// Nested object, such as an embedded buyer or product.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Converts a parsed JSON value, recognising RFC 3339 timestamps.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => Value::DateTime(dt.with_timezone(&Utc)),
                Err(_) => Value::String(s),
            },
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Returns the string slice if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Looks up a key if this is an `Object`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Renders the value for display. Returns `None` for `Null` and empty
    /// strings so callers can substitute a placeholder.
    pub fn to_display(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            Value::Decimal(d) => Some(d.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M").to_string()),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().filter_map(Value::to_display).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            Value::Object(map) => ["name", "title", "email", "id", "_id"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::to_display)),
        }
    }

    /// Total order used for column sorting.
    ///
    /// Numbers compare numerically across `Int`/`Float`/`Decimal`, strings
    /// compare case-insensitively, and `Null` sorts after everything else.
    /// Values of unrelated types order by type rank.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (a, b) if a.as_f64().is_some() && b.as_f64().is_some() => {
                let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                x.total_cmp(&y)
            }
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (a, b) if a.rank() == b.rank() => a
                .to_display()
                .unwrap_or_default()
                .cmp(&b.to_display().unwrap_or_default()),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) => 1,
            Value::DateTime(_) => 2,
            Value::String(_) => 3,
            Value::List(_) => 4,
            Value::Object(_) => 5,
            Value::Null => 6,
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from_json)
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from_json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}
