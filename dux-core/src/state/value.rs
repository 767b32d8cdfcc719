//! State Values
//!
//! A `Value` is one node of the state tree held by a store. Snapshots are
//! immutable: reducers build a new tree for every action instead of editing
//! the old one in place.
//!
//! # Sharing
//!
//! Lists and maps live behind `Arc`. Cloning a snapshot is therefore cheap,
//! and the copy-on-write helpers (`with`, `with_path`) reuse every subtree
//! that is not on the written path. This is what makes reference-based change
//! detection work: a container changes identity exactly when something
//! beneath it was rewritten.
//!
//! # Equality
//!
//! There are two notions of equality:
//!
//! - `PartialEq` is structural and recursive. It is what tests want.
//! - `loosely_eq` is the dispatcher's O(1) "did this change" check: scalars
//!   by value, containers by identity, and `Undefined == Null`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::path::Path;

/// Ordered map used for object nodes.
pub type Map = IndexMap<String, Value>;

/// A node in the state tree.
#[derive(Clone, Default, PartialEq)]
pub enum Value {
    /// The result of reading a key that is not there.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    List(Arc<Vec<Value>>),
    Map(Arc<Map>),
}

impl Value {
    /// An empty map node.
    pub fn map() -> Self {
        Value::Map(Arc::new(Map::new()))
    }

    /// An empty list node.
    pub fn list() -> Self {
        Value::List(Arc::new(Vec::new()))
    }

    /// Whether the value counts as "true" when short-circuiting path lookups.
    ///
    /// `Undefined`, `Null`, `false`, `0`, `NaN` and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) => true,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Shallow change-detection equality.
    ///
    /// Containers are only equal to themselves (same allocation), so this
    /// never walks the tree.
    pub fn loosely_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Index into this value by a single path segment.
    ///
    /// Maps are indexed by key, lists by canonical decimal position (`"1"`,
    /// not `"01"` or `"+1"`). Anything else, or a missing key, yields
    /// `Undefined`.
    pub fn index(&self, segment: &str) -> Value {
        match self {
            Value::Map(map) => map.get(segment).cloned().unwrap_or_default(),
            Value::List(items) => list_index(segment)
                .and_then(|i| items.get(i).cloned())
                .unwrap_or_default(),
            _ => Value::Undefined,
        }
    }

    /// Alias of [`Value::index`] that reads better for map nodes.
    pub fn get(&self, key: &str) -> Value {
        self.index(key)
    }

    /// Return a copy of this node with `key` set to `value`.
    ///
    /// Maps get the key inserted or replaced. Lists accept a decimal index
    /// inside the list or one past its end (append). Any other node is
    /// replaced by a fresh single-entry map.
    pub fn with(&self, key: &str, value: impl Into<Value>) -> Value {
        let value = value.into();
        match self {
            Value::Map(map) => {
                let mut map = (**map).clone();
                map.insert(key.to_string(), value);
                Value::Map(Arc::new(map))
            }
            Value::List(items) => match list_index(key) {
                Some(i) if i < items.len() => {
                    let mut items = items.to_vec();
                    items[i] = value;
                    Value::List(Arc::new(items))
                }
                Some(i) if i == items.len() => {
                    let mut items = items.to_vec();
                    items.push(value);
                    Value::List(Arc::new(items))
                }
                _ => Value::from_iter([(key.to_string(), value)]),
            },
            _ => Value::from_iter([(key.to_string(), value)]),
        }
    }

    /// Return a copy of this tree with the node at `path` replaced.
    ///
    /// Only the containers along `path` are rebuilt; siblings are shared with
    /// `self`. The whole-state path replaces the entire tree.
    pub fn with_path(&self, path: impl Into<Path>, value: impl Into<Value>) -> Value {
        fn set_in(current: &Value, segments: &[String], value: Value) -> Value {
            match segments.split_first() {
                None => value,
                Some((head, rest)) => {
                    let child = current.index(head);
                    current.with(head, set_in(&child, rest, value))
                }
            }
        }

        set_in(self, path.into().segments(), value.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(&**map),
            _ => None,
        }
    }

    /// Convert into a `serde_json::Value`. `Undefined` becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => integral(*n)
                .map(serde_json::Value::from)
                .or_else(|| serde_json::Number::from_f64(*n).map(serde_json::Value::Number))
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::List(items) => items.iter().map(Value::to_json).collect(),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

/// The number as an `i64`, if it is integral and in range.
fn integral(n: f64) -> Option<i64> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
        }
    }
}

// ----------------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::from(items.into_iter().map(Value::from).collect::<Vec<_>>())
            }
            serde_json::Value::Object(map) => {
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
            }
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Map(Arc::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect()))
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(Arc::new(iter.into_iter().collect()))
    }
}

// ----------------------------------------------------------------------------
// Serde
// ----------------------------------------------------------------------------

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Parse a list position, accepting only the canonical decimal spelling.
fn list_index(segment: &str) -> Option<usize> {
    let i = segment.parse::<usize>().ok()?;
    (i.to_string() == segment).then_some(i)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
