use std::fmt;

use serde::Serialize;
use serde_json::Number;

/// A JSON-like in-memory value.
///
/// This mirrors `serde_json::Value` in shape but keeps its own ordered
/// [`Map`] type, since equality between mappings must respect key order
/// (two mappings are equal only if both their entries *and* their entry
/// order match).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Map),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Map> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A short name for the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Standard "non-empty, non-zero, non-null" truthiness, used by the `~`
    /// query operator.
    ///
    /// Known to diverge from the reference GJSON implementation on some
    /// edge cases (e.g. an empty array counts as falsy here, where upstream
    /// may not agree).
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !is_zero_number(n),
            Value::String(s) => !s.is_empty(),
            Value::Sequence(s) => !s.is_empty(),
            Value::Mapping(m) => !m.is_empty(),
        }
    }
}

fn is_zero_number(n: &Number) -> bool {
    if let Some(i) = n.as_i64() {
        i == 0
    } else if let Some(u) = n.as_u64() {
        u == 0
    } else if let Some(f) = n.as_f64() {
        f == 0.0
    } else {
        false
    }
}

/// An ordered mapping from string keys to [`Value`]s.
///
/// Insertion order is preserved and is load-bearing for equality: two
/// `Map`s are equal only if they contain the same entries *in the same
/// order*. A plain `Vec<(String, Value)>` already has order-sensitive
/// `PartialEq`, so that's all this newtype needs to wrap; it serializes
/// itself as a JSON object (not an array of pairs) via a hand-written
/// `Serialize` impl that preserves that same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map(Vec<(String, Value)>);

impl Serialize for Map {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn reversed(&self) -> Self {
        let mut entries = self.0.clone();
        entries.reverse();
        Self(entries)
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::serialize::to_json_text(self, crate::serialize::RenderMode::Default))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => Value::Sequence(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Mapping(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Value::Number(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::Sequence(s) => serde_json::Value::Array(s.into_iter().map(Into::into).collect()),
            Value::Mapping(m) => serde_json::Value::Object(
                m.0.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_equality_is_order_sensitive() {
        let mut a = Map::new();
        a.insert("x", Value::Bool(true));
        a.insert("y", Value::Bool(false));

        let mut b = Map::new();
        b.insert("y", Value::Bool(false));
        b.insert("x", Value::Bool(true));

        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(Number::from(0)).is_truthy());
        assert!(Value::Number(Number::from(1)).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::String("a".into()).is_truthy());
    }

    #[test]
    fn round_trips_through_serde_json() {
        let original: serde_json::Value =
            serde_json::from_str(r#"{"b":2,"a":1,"list":[1,2,3]}"#).unwrap();
        let value: Value = original.clone().into();
        let back: serde_json::Value = value.clone().into();
        assert_eq!(original, back);
        // order preserved
        if let Value::Mapping(m) = value {
            assert_eq!(m.keys().collect::<Vec<_>>(), vec!["b", "a", "list"]);
        } else {
            panic!("expected mapping");
        }
    }
}
