//! Value type classification and conversion, used when a node's type is
//! switched while it is being edited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Null,
    Object,
    Array,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::String,
        DataType::Number,
        DataType::Boolean,
        DataType::Null,
        DataType::Object,
        DataType::Array,
    ];

    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => DataType::String,
            Value::Number(_) => DataType::Number,
            Value::Bool(_) => DataType::Boolean,
            Value::Null => DataType::Null,
            Value::Object(_) => DataType::Object,
            Value::Array(_) => DataType::Array,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Null => "null",
            DataType::Object => "object",
            DataType::Array => "array",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown data type: {}", s))
    }
}

/// Convert `value` to `to`.
///
/// Unparseable numbers become 0; arrays wrap the old value.
pub fn convert_value(value: &Value, to: DataType) -> Value {
    match to {
        DataType::String => Value::String(display_text(value)),
        DataType::Number => Value::Number(to_number(value)),
        DataType::Boolean => Value::Bool(is_truthy(value)),
        DataType::Null => Value::Null,
        DataType::Object => Value::Object(Map::new()),
        DataType::Array => Value::Array(vec![value.clone()]),
    }
}

/// Text shown for a value: strings unquoted, everything else as JSON
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_number(value: &Value) -> Number {
    let parsed = match value {
        Value::Number(n) => return n.clone(),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };

    if parsed.fract() == 0.0 && parsed.abs() < i64::MAX as f64 {
        Number::from(parsed as i64)
    } else {
        Number::from_f64(parsed).unwrap_or_else(|| Number::from(0))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
