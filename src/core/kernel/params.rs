use crate::core::errors::{NexoError, RequestError};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

/// Request parameters in the shape callers build them.
///
/// Behaves like a mapping: inserting an existing key replaces its value.
/// Null values are kept here and dropped by [`canonicalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    entries: Vec<(String, Value)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert `value` when present, otherwise record an explicit null
    pub fn with_opt<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self.with(key, Value::Null),
        }
    }

    /// Insert a decimal as a JSON number
    pub fn with_decimal(self, key: impl Into<String>, value: Decimal) -> Self {
        self.with(key, decimal_to_value(value))
    }

    pub fn with_opt_decimal(self, key: impl Into<String>, value: Option<Decimal>) -> Self {
        self.with_opt(key, value.map(decimal_to_value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no non-null parameter would reach the wire
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_null())
    }

    pub fn canonicalize(&self) -> Vec<(String, String)> {
        canonicalize(self)
    }

    /// `key=value&...` in canonical order, form-encoded
    pub fn to_query_string(&self) -> Result<String, NexoError> {
        serde_urlencoded::to_string(self.canonicalize())
            .map_err(|e| RequestError::Serialization(e.to_string()).into())
    }

    /// Compact JSON object with sorted keys and typed values
    pub fn to_compact_json(&self) -> Result<String, NexoError> {
        let mut entries: Vec<&(String, Value)> = self
            .entries
            .iter()
            .filter(|(_, value)| !value.is_null())
            .collect();
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let object: Map<String, Value> = entries
            .into_iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        serde_json::to_string(&Value::Object(object))
            .map_err(|e| RequestError::Serialization(e.to_string()).into())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Turn parameters into the ordered `(key, value)` sequence used for both
/// signing and transmission.
///
/// Nulls are dropped, values stringified, keys sorted byte-wise. The output
/// depends only on the mapping, not on insertion order.
pub fn canonicalize(params: &RequestParams) -> Vec<(String, String)> {
    let mut canonical: Vec<(String, String)> = params
        .entries
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), stringify(value)))
        .collect();

    canonical.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    canonical
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(stringify)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Keeps the decimal's exact literal. Relies on serde_json's
/// `arbitrary_precision`; without it the number would pass through `f64`.
fn decimal_to_value(value: Decimal) -> Value {
    let literal = value.to_string();
    Number::from_str(&literal).map_or(Value::String(literal), Value::Number)
}
