//! Scalar values and the ordered keyword-argument map that configures a table.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar: either a dataset cell or a table parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Str(String),
}

impl Value {
    /// Parses a textual literal, inferring the narrowest type.
    ///
    /// Empty input is `Null`; `true`/`false` are booleans; integers and floats
    /// are recognized; anything else is kept as text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match trimmed {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        Value::Str(trimmed.to_string())
    }

    /// Returns the name of this value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    /// Returns the integer payload, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float payload, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the text payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

/// A keyword argument holds a value of an unexpected type.
#[derive(Debug, thiserror::Error)]
#[error("keyword argument '{key}' must be {expected}, got {found}")]
pub struct KwargTypeError {
    /// The offending key.
    pub key: String,
    /// The expected type name.
    pub expected: &'static str,
    /// The type name actually found.
    pub found: &'static str,
}

/// The configuration a table definition is bound to.
///
/// Keys are kept sorted so that two maps with the same entries always
/// serialize to the same bytes, whatever order they were inserted in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kwargs(BTreeMap<String, Value>);

impl Kwargs {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, returning the previous one for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Looks up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Looks up a text value, failing if the key holds another type.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, KwargTypeError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(KwargTypeError {
                key: key.to_string(),
                expected: "string",
                found: other.type_name(),
            }),
        }
    }

    /// Looks up an integer value, failing if the key holds another type.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>, KwargTypeError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(KwargTypeError {
                key: key.to_string(),
                expected: "int",
                found: other.type_name(),
            }),
        }
    }

    /// Returns a copy of `self` with every entry of `defaults` that `self`
    /// does not already define.
    pub fn or_defaults(&self, defaults: &Kwargs) -> Kwargs {
        let mut merged = defaults.0.clone();
        merged.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Kwargs(merged)
    }

    /// Returns a copy of `self` without the given keys.
    pub fn without(&self, keys: &[&str]) -> Kwargs {
        Kwargs(
            self.0
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Kwargs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Kwargs(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_infers_types() {
        assert_eq!(Value::parse(""), Value::Null);
        assert_eq!(Value::parse("true"), Value::Bool(true));
        assert_eq!(Value::parse(" 42 "), Value::Int(42));
        assert_eq!(Value::parse("2.5"), Value::Float(2.5));
        assert_eq!(Value::parse("Ada"), Value::Str("Ada".to_string()));
    }

    #[test]
    fn display_null_is_empty() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(7).to_string(), "7");
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = Kwargs::new().with("b", 2i64).with("a", 1i64);
        let b = Kwargs::new().with("a", 1i64).with("b", 2i64);
        assert_eq!(a, b);
        let keys: Vec<&str> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn typed_getters() {
        let kw = Kwargs::new().with("path", "people.csv").with("limit", 3i64);
        assert_eq!(kw.get_str("path").unwrap(), Some("people.csv"));
        assert_eq!(kw.get_int("limit").unwrap(), Some(3));
        assert_eq!(kw.get_int("missing").unwrap(), None);

        let err = kw.get_int("path").unwrap_err();
        assert_eq!(
            err.to_string(),
            "keyword argument 'path' must be int, got string"
        );
    }

    #[test]
    fn or_defaults_keeps_explicit_values() {
        let defaults = Kwargs::new().with("limit", 10i64).with("cache_dir", "/tmp");
        let explicit = Kwargs::new().with("limit", 3i64);
        let merged = explicit.or_defaults(&defaults);
        assert_eq!(merged.get("limit"), Some(&Value::Int(3)));
        assert_eq!(merged.get("cache_dir"), Some(&Value::from("/tmp")));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn without_drops_listed_keys() {
        let kwargs = Kwargs::new()
            .with("min_age", 21i64)
            .with("path", "people.csv")
            .with("cache_dir", "/tmp");
        let trimmed = kwargs.without(&["min_age", "missing"]);
        assert_eq!(trimmed.len(), 2);
        assert!(!trimmed.contains_key("min_age"));
        assert_eq!(kwargs.len(), 3);
    }

    #[test]
    fn collect_from_pairs() {
        let kw: Kwargs = vec![("x", 1i64), ("y", 2i64)].into_iter().collect();
        assert_eq!(kw.len(), 2);
        assert!(kw.contains_key("x"));
    }
}
