//! Session types shared by the store, the codec and application handlers.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Session values keyed by string. Ordered so encoding is deterministic.
pub type SessionValues = BTreeMap<String, Value>;

/// A session value. The closed set of shapes the codec can round-trip.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(SessionValues),
}

impl Value {
    /// Stable shape name, used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&SessionValues> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<SessionValues> for Value {
    fn from(map: SessionValues) -> Self {
        Value::Map(map)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a session value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Int(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        i64::try_from(n)
            .map(Value::Int)
            .map_err(|_| E::custom(format!("integer {} out of range", n)))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
        Ok(Value::Float(n))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = SessionValues::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

/// Document key of the session called `name`. The name is the identity.
pub fn session_id_for(name: &str) -> String {
    name.to_string()
}

/// Server-side state for one user, keyed by cookie name.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Cookie name; also the document collection.
    name: String,

    /// Document key inside the collection. Derived from the name.
    pub id: String,

    /// Application data.
    pub values: SessionValues,

    /// True until the session has been persisted once.
    pub is_new: bool,
}

impl Session {
    /// Create a fresh, never persisted session.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: session_id_for(&name),
            name,
            values: SessionValues::new(),
            is_new: true,
        }
    }

    /// Rebuild a session from persisted values.
    pub fn hydrate(name: impl Into<String>, values: SessionValues) -> Self {
        let mut session = Self::new(name);
        session.values = values;
        session.is_new = false;
        session
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_fresh() {
        let session = Session::new("testname");
        assert_eq!(session.name(), "testname");
        assert_eq!(session.id, "testname");
        assert!(session.is_new);
        assert!(session.values.is_empty());
    }

    #[test]
    fn test_hydrated_session_is_not_new() {
        let mut values = SessionValues::new();
        values.insert("testkey".to_string(), Value::from("testvalue"));

        let session = Session::hydrate("testname", values.clone());
        assert!(!session.is_new);
        assert_eq!(session.values, values);
    }

    #[test]
    fn test_session_insert_and_get() {
        let mut session = Session::new("s");
        assert!(session.insert("count", 3).is_none());
        assert_eq!(session.insert("count", 4), Some(Value::Int(3)));
        assert_eq!(session.get("count").and_then(Value::as_i64), Some(4));
        assert_eq!(session.remove("count"), Some(Value::Int(4)));
        assert!(session.get("count").is_none());
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from(true).kind(), "bool");
        assert_eq!(Value::from(1).kind(), "integer");
        assert_eq!(Value::from(1.5).kind(), "float");
        assert_eq!(Value::from("x").kind(), "string");
        assert_eq!(Value::from(vec!["a", "b"]).kind(), "list");
        assert_eq!(Value::from(SessionValues::new()).kind(), "map");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::from(7).as_str(), None);
        assert_eq!(Value::from(7).as_f64(), Some(7.0));
        assert_eq!(Value::from(false).as_bool(), Some(false));
        assert_eq!(
            Value::from(vec![1, 2]).as_list(),
            Some(&[Value::Int(1), Value::Int(2)][..])
        );
        assert!(Value::default().is_null());
    }
}
