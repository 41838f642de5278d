//! Dynamically typed values held by metadata documents.
//!
//! [`Value`] is the closed set of shapes the persistence layer understands:
//! null, scalars, nested metadata, collections, maps, keys, versions and
//! proxied (polymorphic) objects. Equality is content equality - floats
//! compare by their exact representation, sets and maps ignore insertion
//! order, lists do not.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::core::{Key, Metadata, Version};
use crate::util::{numeric, Error, Result};

/// A polymorphic object captured as its discriminator plus its own metadata.
///
/// The concrete type is rebuilt later through an
/// [`InstanceGetter`](crate::registry::InstanceGetter) holding the factory
/// registered under `type_key`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProxyValue {
    /// Discriminator naming the concrete type.
    pub type_key: Key,
    /// The object's own metadata representation.
    pub metadata: Metadata,
}

/// A dynamically typed value.
#[derive(Clone, Debug)]
pub enum Value {
    /// Present-with-null; distinct from a key being absent altogether.
    Null,
    Bool(bool),
    Char(char),
    String(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    /// Nested document.
    Metadata(Metadata),
    Key(Key),
    Version(Version),
    /// Ordered collection; duplicates allowed.
    List(Vec<Value>),
    /// Insertion-ordered collection without duplicates.
    Set(Vec<Value>),
    /// Collection held sorted by [`Value::total_cmp`].
    SortedSet(Vec<Value>),
    /// Insertion-ordered key/value pairs; keys unique.
    Map(Vec<(Value, Value)>),
    /// Key/value pairs held sorted by key.
    SortedMap(Vec<(Value, Value)>),
    /// Polymorphic object awaiting reconstruction.
    Proxy(ProxyValue),
}

impl Value {
    /// Build a list from anything convertible to values.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build an insertion-ordered set; later duplicates are dropped.
    pub fn set<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            let v = item.into();
            if !out.contains(&v) {
                out.push(v);
            }
        }
        Self::Set(out)
    }

    /// Build a sorted set; duplicates are dropped.
    pub fn sorted_set<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        let mut out: Vec<Value> = items.into_iter().map(Into::into).collect();
        out.sort_by(Value::total_cmp);
        out.dedup();
        Self::SortedSet(out)
    }

    /// Build an insertion-ordered map; a repeated key overwrites its value.
    pub fn map<K: Into<Value>, V: Into<Value>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let mut out: Vec<(Value, Value)> = Vec::new();
        for (k, v) in pairs {
            let k = k.into();
            let v = v.into();
            if let Some(slot) = out.iter_mut().find(|(existing, _)| *existing == k) {
                slot.1 = v;
            } else {
                out.push((k, v));
            }
        }
        Self::Map(out)
    }

    /// Build a map held sorted by key; a repeated key overwrites its value.
    pub fn sorted_map<K: Into<Value>, V: Into<Value>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let Value::Map(mut out) = Self::map(pairs) else {
            unreachable!()
        };
        out.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        Self::SortedMap(out)
    }

    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of this value's shape, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Metadata(_) => "metadata",
            Self::Key(_) => "key",
            Self::Version(_) => "version",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::SortedSet(_) => "sorted set",
            Self::Map(_) => "map",
            Self::SortedMap(_) => "sorted map",
            Self::Proxy(_) => "proxied object",
        }
    }

    /// Typed extraction through [`FromValue`].
    pub fn get_as<T: FromValue>(&self) -> Result<T> {
        T::from_value(self)
    }

    /// Rank used as the first comparison criterion of the total order.
    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Char(_) => 2,
            Self::String(_) => 3,
            Self::I8(_) => 4,
            Self::I16(_) => 5,
            Self::I32(_) => 6,
            Self::I64(_) => 7,
            Self::F32(_) => 8,
            Self::F64(_) => 9,
            Self::Metadata(_) => 10,
            Self::Key(_) => 11,
            Self::Version(_) => 12,
            Self::List(_) => 13,
            Self::Set(_) => 14,
            Self::SortedSet(_) => 15,
            Self::Map(_) => 16,
            Self::SortedMap(_) => 17,
            Self::Proxy(_) => 18,
        }
    }

    /// Deterministic total order over all values.
    ///
    /// Different shapes order by rank; floats use IEEE total ordering; sets
    /// and maps compare their sorted contents so that insertion order never
    /// influences the result.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Char(a), Char(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (I8(a), I8(b)) => a.cmp(b),
            (I16(a), I16(b)) => a.cmp(b),
            (I32(a), I32(b)) => a.cmp(b),
            (I64(a), I64(b)) => a.cmp(b),
            (F32(a), F32(b)) => a.total_cmp(b),
            (F64(a), F64(b)) => a.total_cmp(b),
            (Metadata(a), Metadata(b)) => a.content_cmp(b),
            (Key(a), Key(b)) => a.cmp(b),
            (Version(a), Version(b)) => a.cmp(b),
            (List(a), List(b)) | (SortedSet(a), SortedSet(b)) => cmp_seq(a, b),
            (Set(a), Set(b)) => cmp_seq(&sorted(a), &sorted(b)),
            (SortedMap(a), SortedMap(b)) => cmp_pairs(a, b),
            (Map(a), Map(b)) => cmp_pairs(&sorted_pairs(a), &sorted_pairs(b)),
            (Proxy(a), Proxy(b)) => a
                .type_key
                .cmp(&b.type_key)
                .then_with(|| a.metadata.content_cmp(&b.metadata)),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

fn sorted(values: &[Value]) -> Vec<Value> {
    let mut out = values.to_vec();
    out.sort_by(Value::total_cmp);
    out
}

fn sorted_pairs(pairs: &[(Value, Value)]) -> Vec<(Value, Value)> {
    let mut out = pairs.to_vec();
    out.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    out
}

fn cmp_seq(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = x.total_cmp(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn cmp_pairs(a: &[(Value, Value)], b: &[(Value, Value)]) -> Ordering {
    for ((ka, va), (kb, vb)) in a.iter().zip(b) {
        let ord = ka.total_cmp(kb).then_with(|| va.total_cmp(vb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Char(v) => v.hash(state),
            Self::String(v) => v.hash(state),
            Self::I8(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::Metadata(v) => v.hash(state),
            Self::Key(v) => v.hash(state),
            Self::Version(v) => v.hash(state),
            Self::List(v) | Self::SortedSet(v) => v.hash(state),
            Self::Set(v) => sorted(v).hash(state),
            Self::SortedMap(v) => v.hash(state),
            Self::Map(v) => sorted_pairs(v).hash(state),
            Self::Proxy(v) => v.hash(state),
        }
    }
}

// === Conversions into Value ===

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<Metadata> for Value {
    fn from(v: Metadata) -> Self {
        Self::Metadata(v)
    }
}

impl From<Version> for Value {
    fn from(v: Version) -> Self {
        Self::Version(v)
    }
}

impl<V> From<Key<V>> for Value {
    fn from(v: Key<V>) -> Self {
        Self::Key(v.as_untyped())
    }
}

impl From<ProxyValue> for Value {
    fn from(v: ProxyValue) -> Self {
        Self::Proxy(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

// === Typed extraction ===

/// Conversion out of a dynamically typed value.
///
/// Numeric targets route through the precision guard: a stored wide number is
/// narrowed only when the narrowing is provably lossless (f64 -> f32 precision
/// excepted).
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(Error::mismatch("bool", other.kind_name())),
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Char(v) => Ok(*v),
            other => Err(Error::mismatch("char", other.kind_name())),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v.clone()),
            other => Err(Error::mismatch("string", other.kind_name())),
        }
    }
}

impl FromValue for i8 {
    fn from_value(value: &Value) -> Result<Self> {
        numeric::to_i8(value)
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> Result<Self> {
        numeric::to_i16(value)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        numeric::to_i32(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        numeric::to_i64(value)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self> {
        numeric::to_f32(value)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        numeric::to_f64(value)
    }
}

impl FromValue for Metadata {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Metadata(v) => Ok(v.clone()),
            other => Err(Error::mismatch("metadata", other.kind_name())),
        }
    }
}

impl FromValue for Version {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Version(v) => Ok(*v),
            other => Err(Error::mismatch("version", other.kind_name())),
        }
    }
}

impl FromValue for Key {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Key(v) => Ok(v.clone()),
            other => Err(Error::mismatch("key", other.kind_name())),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

/// Collections extract element-wise from any collection shape.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::List(items) | Value::Set(items) | Value::SortedSet(items) => {
                items.iter().map(T::from_value).collect()
            }
            other => Err(Error::mismatch("collection", other.kind_name())),
        }
    }
}

/// `None` maps the present-with-null sentinel; anything else extracts as `Some`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
