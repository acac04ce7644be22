//! The open value model used for receiver configuration and derived data.
//!
//! Configuration travels as a loosely-typed tree. On the wire it is a JSON
//! structured value; internally text is kept as the raw bytes handed to us by
//! the store, and only has to be valid UTF-8 once it is encoded again.

use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// A receiver's configuration or derived data map.
pub type Configuration = BTreeMap<String, Value>;

/// Raised when a value cannot be represented in the structured wire format.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("invalid UTF-8 in string: \"{0}\"")]
    InvalidUtf8(String),
}

/// A single opaque configuration value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    /// Raw text bytes. Not guaranteed to be UTF-8 until encoded.
    Text(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the text content if this is valid UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Encodes this value into the structured wire format.
    ///
    /// Fails on the first text value that is not valid UTF-8 instead of
    /// replacing or truncating it.
    pub fn to_structured(&self) -> Result<serde_json::Value, EncodeError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::Text(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => serde_json::Value::String(text.to_string()),
                Err(_) => return Err(EncodeError::InvalidUtf8(bytes.escape_ascii().to_string())),
            },
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_structured)
                    .collect::<Result<Vec<_>, EncodeError>>()?,
            ),
            Value::Map(map) => serde_json::Value::Object(encode_map(map)?),
        })
    }
}

/// Encodes a configuration map into a structured JSON object.
pub fn encode_map(map: &Configuration) -> Result<serde_json::Map<String, serde_json::Value>, EncodeError> {
    map.iter()
        .map(|(key, value)| value.to_structured().map(|encoded| (key.clone(), encoded)))
        .collect()
}

/// Decodes a structured JSON object into a configuration map.
pub fn decode_map(object: serde_json::Map<String, serde_json::Value>) -> Configuration {
    object
        .into_iter()
        .map(|(key, value)| (key, Value::from(value)))
        .collect()
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::Text(s.into_bytes()),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Map(decode_map(object)),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text.into_bytes())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_structured()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
