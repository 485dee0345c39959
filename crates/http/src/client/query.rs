//! Query string serialization
//!
//! Sequences are written in repeated-key form (`labelIds=1&labelIds=2`), never
//! with bracket notation, because the backend binds repeated keys to lists.
//! Keys and values are percent-encoded and pairs are joined with `&` in
//! insertion order.

use serde_json::Value;
use std::fmt::{self, Display};

/// A single query value before encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Null or missing; the key is omitted entirely
    Absent,
    /// Emitted as one `key=value` pair
    Single(String),
    /// Emitted as one `key=value` pair per element
    Many(Vec<String>),
}

/// Ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.entries
            .push((key.into(), ParamValue::Single(value.to_string())));
        self
    }

    /// Add a parameter that is skipped when `None`
    #[must_use]
    pub fn optional<T: Display>(mut self, key: impl Into<String>, value: Option<T>) -> Self {
        let value = value.map_or(ParamValue::Absent, |v| ParamValue::Single(v.to_string()));
        self.entries.push((key.into(), value));
        self
    }

    /// Add a sequence parameter, repeated once per element
    #[must_use]
    pub fn many<I, T>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.entries.push((key.into(), ParamValue::Many(values)));
        self
    }

    /// Build parameters from a JSON object, keeping its key order.
    ///
    /// Anything other than an object yields an empty parameter set.
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let entries = map
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Null => ParamValue::Absent,
                    Value::Array(items) => ParamValue::Many(
                        items
                            .iter()
                            .filter(|item| !item.is_null())
                            .map(plain_string)
                            .collect(),
                    ),
                    other => ParamValue::Single(plain_string(other)),
                };
                (key.clone(), value)
            })
            .collect();

        Self { entries }
    }

    /// True when serialization would produce an empty string
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, value)| match value {
            ParamValue::Absent => true,
            ParamValue::Single(_) => false,
            ParamValue::Many(values) => values.is_empty(),
        })
    }

    /// Serialize into the `a=1&b=2` wire form (without a leading `?`)
    pub fn serialize(&self) -> String {
        let mut parts = Vec::new();
        for (key, value) in &self.entries {
            match value {
                ParamValue::Absent => {}
                ParamValue::Single(v) => parts.push(encode_pair(key, v)),
                ParamValue::Many(values) => {
                    parts.extend(values.iter().map(|v| encode_pair(key, v)));
                }
            }
        }
        parts.join("&")
    }
}

impl Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

fn encode_pair(key: &str, value: &str) -> String {
    format!(
        "{}={}",
        urlencoding::encode(key),
        urlencoding::encode(value)
    )
}

// Strings are emitted raw rather than JSON-quoted.
fn plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
