//! The record/table data model.
//!
//! A [`Record`] is an ordered mapping from string field names to JSON values;
//! a [`Table`] is a finite ordered sequence of records. Operators consume and
//! produce tables and never mutate their input.
//!
//! Sort, reduce, and join address records through a [`KeyTuple`] of field
//! names and compare the projected values with [`value_cmp`], a total order
//! over JSON values. Values of the same type compare naturally; values of
//! different types order by type rank (null < bool < number < string <
//! array < object), so heterogeneous columns sort deterministically instead
//! of aborting the run.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Map;
pub use serde_json::Value;

use crate::error::{GraphError, Result};
use crate::utils::OrdF64;

/// A finite ordered sequence of records.
pub type Table = Vec<Record>;

/// A single record: an ordered mapping from field names to JSON values.
///
/// Field order is insertion order and is observable (join emits merged
/// records with fields in ascending name order). Equality is pointwise by
/// field name and value, independent of field order.
///
/// A record deserializes from a JSON object only; any other JSON value is
/// rejected, which is what makes a JSONL source line map 1:1 to a record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Build a record from a JSON value, which must be an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Insert a field, returning the previous value if the field existed.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// True if the record has a field with this name.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names in record order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fields and values in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Move a field to a new name, preserving the order of the other fields.
    /// The renamed field goes to the end. No-op if `from` is absent.
    pub(crate) fn rename(&mut self, from: &str, to: String) {
        if let Some(value) = self.0.shift_remove(from) {
            self.0.insert(to, value);
        }
    }

    /// Project the values of a key tuple out of this record, in tuple order.
    ///
    /// Every key field must be present; the first absent field aborts with
    /// [`GraphError::MissingField`].
    pub(crate) fn key_values(&self, keys: &KeyTuple) -> Result<Vec<Value>> {
        keys.iter()
            .map(|field| {
                self.get(field)
                    .cloned()
                    .ok_or_else(|| GraphError::MissingField { field: field.to_owned() })
            })
            .collect()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An ordered tuple of field names used by sort, reduce, and join.
///
/// Converts from a single name, an array of names, a slice, or a vector,
/// so call sites can write `"word"` or `["doc_id", "word"]` directly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyTuple(Vec<String>);

impl KeyTuple {
    /// The empty key tuple. Only cross joins accept it.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// True if the tuple names no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key field names in tuple order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True if `field` is one of the key fields.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|k| k == field)
    }
}

impl From<&str> for KeyTuple {
    fn from(name: &str) -> Self {
        Self(vec![name.to_owned()])
    }
}

impl From<String> for KeyTuple {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl<const N: usize> From<[&str; N]> for KeyTuple {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| (*n).to_owned()).collect())
    }
}

impl From<&[&str]> for KeyTuple {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| (*n).to_owned()).collect())
    }
}

impl From<Vec<String>> for KeyTuple {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

/// Total order over JSON values.
///
/// Same-type values compare naturally: booleans false-first, numbers
/// numerically (integers exactly, mixed representations by `total_cmp`),
/// strings and arrays lexicographically, objects by their sorted field
/// entries. Different types order by rank:
/// null < bool < number < string < array < object.
#[must_use]
pub fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => number_cmp(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (u, v) in x.iter().zip(y) {
                let ord = value_cmp(u, v);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => object_cmp(x, y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn number_cmp(a: &serde_json::Number, b: &serde_json::Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    OrdF64(a.as_f64().unwrap_or(f64::NAN)).cmp(&OrdF64(b.as_f64().unwrap_or(f64::NAN)))
}

fn object_cmp(a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    let mut xs: Vec<(&String, &Value)> = a.iter().collect();
    let mut ys: Vec<(&String, &Value)> = b.iter().collect();
    xs.sort_by(|p, q| p.0.cmp(q.0));
    ys.sort_by(|p, q| p.0.cmp(q.0));
    for ((ka, va), (kb, vb)) in xs.iter().zip(&ys) {
        let ord = ka.cmp(kb).then_with(|| value_cmp(va, vb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    xs.len().cmp(&ys.len())
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Lexicographic comparison of two projected key tuples.
pub(crate) fn key_cmp(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = value_cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}
