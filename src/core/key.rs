//! String-identified, phantom-typed handles.
//!
//! A [`Key`] addresses a value inside a metadata document or a registry. Its
//! identity is the id string alone: two keys with the same id are equal even
//! when their phantom types differ. The phantom type is what makes typed reads
//! (`get_as`) and the factory registry statically checked.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::Value;

/// Immutable handle identified by a string id.
///
/// The type parameter records what the key is expected to address; it carries
/// no runtime weight and never participates in equality or ordering.
pub struct Key<V = Value> {
    id: Arc<str>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Key<V> {
    /// Create a key from its id string.
    pub fn of(id: impl Into<String>) -> Self {
        Self {
            id: Arc::from(id.into()),
            _marker: PhantomData,
        }
    }

    /// The identifying string.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reinterpret this key with a different expected value type.
    ///
    /// Identity is unchanged; only the static expectation moves.
    pub fn retyped<W>(&self) -> Key<W> {
        Key {
            id: Arc::clone(&self.id),
            _marker: PhantomData,
        }
    }

    /// Erase the expected value type.
    pub fn as_untyped(&self) -> Key {
        self.retyped()
    }
}

impl<V> Clone for Key<V> {
    fn clone(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            _marker: PhantomData,
        }
    }
}

impl<V, W> PartialEq<Key<W>> for Key<V> {
    fn eq(&self, other: &Key<W>) -> bool {
        self.id == other.id
    }
}

impl<V> Eq for Key<V> {}

impl<V> PartialOrd for Key<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V> Ord for Key<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<V> Hash for Key<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<V> fmt::Display for Key<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl<V> fmt::Debug for Key<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.id)
    }
}
