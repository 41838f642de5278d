//! Ordered, heterogeneous, null-aware key/value documents.
//!
//! The family has three members:
//! - [`MetadataBuilder`] - mutable accumulator with put/clear
//! - [`Metadata`] - frozen snapshot, structurally immutable, cheap to clone
//! - [`MetadataView`] - read-only borrow over either, no copy
//!
//! A key that was `put` with null stays listed in the document: reading it
//! yields [`Value::Null`], while a key never put at all is a
//! [`KeyNotFound`](crate::Error::KeyNotFound) error. Equality and hashing
//! consider mapping content only - neither insertion order nor the version
//! tag participates.

use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::core::{FromValue, Key, Value, Version};
use crate::util::{Error, Result};

/// Uses SmallVec optimization for the common case of few entries; lookups are
/// linear scans, which documents of this size never notice.
type Entries = SmallVec<[(Key, Value); 8]>;

/// Frozen metadata snapshot.
#[derive(Clone)]
pub struct Metadata {
    version: Version,
    entries: Arc<Entries>,
}

/// Mutable metadata accumulator.
#[derive(Clone)]
pub struct MetadataBuilder {
    version: Version,
    entries: Entries,
}

/// Read-only view over a builder or a snapshot.
#[derive(Clone, Copy)]
pub struct MetadataView<'a> {
    version: Version,
    entries: &'a [(Key, Value)],
}

impl Metadata {
    /// Start a new document at the given format version.
    pub fn builder(version: Version) -> MetadataBuilder {
        MetadataBuilder {
            version,
            entries: Entries::new(),
        }
    }

    /// Read-only view of this snapshot.
    pub fn view(&self) -> MetadataView<'_> {
        MetadataView {
            version: self.version,
            entries: &self.entries,
        }
    }

    /// Format version carried by this document.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Bound value, or [`Error::KeyNotFound`] when the key was never put.
    pub fn get<V>(&self, key: &Key<V>) -> Result<&Value> {
        self.view().into_get(key)
    }

    /// Typed read through [`FromValue`].
    pub fn get_as<V: FromValue>(&self, key: &Key<V>) -> Result<V> {
        self.view().get_as(key)
    }

    /// True when the key is present (including present-with-null).
    pub fn has<V>(&self, key: &Key<V>) -> bool {
        self.view().has(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[(Key, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content comparison ignoring version and insertion order.
    pub(crate) fn content_cmp(&self, other: &Metadata) -> Ordering {
        self.view().content_cmp(other.view())
    }
}

impl MetadataBuilder {
    /// Read-only view of the current contents, without copying.
    pub fn view(&self) -> MetadataView<'_> {
        MetadataView {
            version: self.version,
            entries: &self.entries,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Bind a key to a value.
    ///
    /// The first put of a key fixes its place in the insertion order; later
    /// puts of the same key overwrite the value in place.
    pub fn put<V: Into<Value>>(&mut self, key: &Key<V>, value: V) -> &mut Self {
        self.put_value(key.as_untyped(), value.into())
    }

    /// Bind a key to the present-with-null sentinel.
    pub fn put_null<V>(&mut self, key: &Key<V>) -> &mut Self {
        self.put_value(key.as_untyped(), Value::Null)
    }

    /// Untyped insertion; the codec uses this while reading a file.
    pub fn put_value(&mut self, key: Key, value: Value) -> &mut Self {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    /// Remove a key and its value, if present.
    pub fn clear<V>(&mut self, key: &Key<V>) -> &mut Self {
        if let Some(pos) = self.entries.iter().position(|(k, _)| k == key) {
            self.entries.remove(pos);
        }
        self
    }

    /// Remove every entry.
    pub fn clear_all(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Deep-duplicate this builder.
    pub fn copy(&self) -> MetadataBuilder {
        self.clone()
    }

    /// Freeze into an immutable snapshot.
    ///
    /// The snapshot shares no mutable state with this builder; the builder
    /// stays usable afterwards.
    pub fn build(&self) -> Metadata {
        Metadata {
            version: self.version,
            entries: Arc::new(self.entries.clone()),
        }
    }

    pub fn get<V>(&self, key: &Key<V>) -> Result<&Value> {
        self.view().into_get(key)
    }

    pub fn get_as<V: FromValue>(&self, key: &Key<V>) -> Result<V> {
        self.view().get_as(key)
    }

    pub fn has<V>(&self, key: &Key<V>) -> bool {
        self.view().has(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> MetadataView<'a> {
    pub fn version(&self) -> Version {
        self.version
    }

    /// Like [`Metadata::get`], borrowing for the view's lifetime.
    pub fn into_get<V>(self, key: &Key<V>) -> Result<&'a Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::KeyNotFound(key.id().to_string()))
    }

    pub fn get<V>(&self, key: &Key<V>) -> Result<&Value> {
        (*self).into_get(key)
    }

    pub fn get_as<V: FromValue>(&self, key: &Key<V>) -> Result<V> {
        V::from_value(self.get(key)?)
    }

    pub fn has<V>(&self, key: &Key<V>) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn entries(&self) -> &'a [(Key, Value)] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sorted_entries(&self) -> Vec<&'a (Key, Value)> {
        let mut out: Vec<&(Key, Value)> = self.entries.iter().collect();
        out.sort_by(|(a, _), (b, _)| a.cmp(b));
        out
    }

    pub(crate) fn content_cmp(&self, other: MetadataView<'_>) -> Ordering {
        let left = self.sorted_entries();
        let right = other.sorted_entries();
        for ((ka, va), (kb, vb)) in left.iter().zip(&right) {
            let ord = ka.cmp(kb).then_with(|| va.total_cmp(vb));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        left.len().cmp(&right.len())
    }
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        self.content_cmp(other) == Ordering::Equal
    }
}

impl Eq for Metadata {}

impl Hash for Metadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (key, value) in self.view().sorted_entries() {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metadata(v{}) ", self.version)?;
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k.id(), v)))
            .finish()
    }
}

impl fmt::Debug for MetadataBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetadataBuilder(v{}) ", self.version)?;
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k.id(), v)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1() -> Version {
        Version::of(1, 0)
    }

    #[test]
    fn test_put_get_insertion_order() {
        let mut b = Metadata::builder(v1());
        b.put(&Key::of("b"), 2).put(&Key::of("a"), 1);
        b.put(&Key::of("b"), 20); // overwrite keeps position

        let md = b.build();
        let ids: Vec<&str> = md.keys().map(|k| k.id()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(*md.get(&Key::<i32>::of("b")).unwrap(), Value::I32(20));
    }

    #[test]
    fn test_null_vs_absent() {
        let mut b = Metadata::builder(v1());
        b.put_null(&Key::<String>::of("present"));
        let md = b.build();

        assert!(md.get(&Key::<String>::of("present")).unwrap().is_null());
        assert!(md.keys().any(|k| k.id() == "present"));

        let err = md.get(&Key::<String>::of("absent")).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(_)));
    }

    #[test]
    fn test_frozen_shares_no_mutable_state() {
        let mut b = Metadata::builder(v1());
        b.put(&Key::of("x"), 1);
        let md = b.build();
        b.put(&Key::of("x"), 99).put(&Key::of("y"), 2);

        assert_eq!(md.len(), 1);
        assert_eq!(*md.get(&Key::<i32>::of("x")).unwrap(), Value::I32(1));
    }

    #[test]
    fn test_equality_ignores_order_and_version() {
        let mut a = Metadata::builder(Version::of(1, 0));
        a.put(&Key::of("x"), 1).put(&Key::of("y"), 2);
        let mut b = Metadata::builder(Version::of(9, 9));
        b.put(&Key::of("y"), 2).put(&Key::of("x"), 1);

        assert_eq!(a.build(), b.build());
    }

    #[test]
    fn test_inequality_on_content() {
        let mut a = Metadata::builder(v1());
        a.put(&Key::of("x"), 1);
        let mut b = Metadata::builder(v1());
        b.put(&Key::of("x"), 2);
        assert_ne!(a.build(), b.build());
    }

    #[test]
    fn test_clear() {
        let mut b = Metadata::builder(v1());
        b.put(&Key::of("x"), 1).put(&Key::of("y"), 2);
        b.clear(&Key::<i32>::of("x"));
        let md = b.build();
        assert!(!md.has(&Key::<i32>::of("x")));
        assert!(md.has(&Key::<i32>::of("y")));
    }

    #[test]
    fn test_copy_is_deep() {
        let mut b = Metadata::builder(v1());
        b.put(&Key::of("x"), 1);
        let mut c = b.copy();
        c.put(&Key::of("x"), 2);
        assert_eq!(b.get_as::<i32>(&Key::of("x")).unwrap(), 1);
        assert_eq!(c.get_as::<i32>(&Key::of("x")).unwrap(), 2);
    }

    #[test]
    fn test_view_without_copy() {
        let mut b = Metadata::builder(v1());
        b.put(&Key::of("x"), 1);
        let view = b.view();
        assert_eq!(view.get_as::<i32>(&Key::of("x")).unwrap(), 1);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_typed_get_narrowing() {
        let mut b = Metadata::builder(v1());
        b.put(&Key::of("wide"), 300_i64);
        let md = b.build();
        assert_eq!(md.get_as::<i32>(&Key::of("wide")).unwrap(), 300);
        assert!(md
            .get_as::<i8>(&Key::<i8>::of("wide"))
            .is_err());
    }

    #[test]
    fn test_nested_metadata_value() {
        let mut inner = Metadata::builder(v1());
        inner.put(&Key::of("deep"), "yes");
        let mut outer = Metadata::builder(v1());
        outer.put(&Key::of("inner"), inner.build());
        let md = outer.build();

        let got: Metadata = md.get_as(&Key::of("inner")).unwrap();
        assert_eq!(got.get_as::<String>(&Key::of("deep")).unwrap(), "yes");
    }
}
