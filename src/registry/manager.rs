//! The store/retrieve adapter contract and manager aggregation.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::core::{Key, Metadata, Value, Version};
use crate::util::{Error, Result};

/// Anything able to snapshot itself as metadata and restore from a snapshot.
///
/// `store` must return a complete, self-consistent snapshot; `retrieve` must
/// fully reinitialize the implementor's state from one - partial application
/// is a contract violation, so implementations should validate the whole
/// snapshot before mutating anything.
pub trait MetadataManager {
    fn store(&self) -> Metadata;
    fn retrieve(&mut self, source: &Metadata) -> Result<()>;
}

/// Shared handle to a manager.
///
/// The framework is single-threaded by design; the lock exists only so that
/// retrieve dispatch can cross onto the dedicated worker thread.
pub type SharedManager = Arc<Mutex<dyn MetadataManager + Send>>;

/// Wrap a manager into a shared handle.
pub fn shared(manager: impl MetadataManager + Send + 'static) -> SharedManager {
    Arc::new(Mutex::new(manager))
}

/// Format version of the aggregate document a collection stores itself as.
const COLLECTION_VERSION: Version = Version::of(1, 0);

/// Ordered aggregation of (key, manager) pairs.
///
/// Registration order is preserved and drives iteration, which in turn
/// drives both write order and retrieve dispatch order.
#[derive(Default)]
pub struct ManagerCollection {
    entries: Vec<(Key<Metadata>, SharedManager)>,
}

impl ManagerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manager under a key. Registering an already-bound key is a
    /// programmer error and fails fast.
    pub fn add(&mut self, key: Key<Metadata>, manager: SharedManager) -> Result<()> {
        if self.contains(&key) {
            return Err(Error::AlreadyRegistered(key.id().to_string()));
        }
        self.entries.push((key, manager));
        Ok(())
    }

    /// Remove a registration. Removing an unbound key is an error.
    pub fn remove(&mut self, key: &Key<Metadata>) -> Result<SharedManager> {
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => Ok(self.entries.remove(pos).1),
            None => Err(Error::NotRegistered(key.id().to_string())),
        }
    }

    pub fn contains(&self, key: &Key<Metadata>) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Registered pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key<Metadata>, &SharedManager)> {
        self.entries.iter().map(|(k, m)| (k, m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot every manager into one aggregate document, each under its
    /// registration key, in registration order.
    pub fn store_all(&self) -> Metadata {
        let mut builder = Metadata::builder(COLLECTION_VERSION);
        for (key, manager) in &self.entries {
            let snapshot = manager.lock().store();
            builder.put_value(key.as_untyped(), Value::Metadata(snapshot));
        }
        builder.build()
    }

    /// Restore every registered manager from the aggregate document.
    ///
    /// A key missing from the source is skipped (the manager may postdate the
    /// document); the first failing manager aborts with its error. Callers
    /// that need isolation between managers dispatch entry by entry instead.
    pub fn retrieve_all(&self, source: &Metadata) -> Result<()> {
        for (key, manager) in &self.entries {
            if !source.has(key) {
                tracing::debug!(key = key.id(), "no stored entry; skipping manager");
                continue;
            }
            let snapshot: Metadata = source.get_as(key)?;
            manager.lock().retrieve(&snapshot)?;
        }
        Ok(())
    }
}

/// A collection can itself act as one manager, nesting its members' state as
/// a single sub-document.
impl MetadataManager for ManagerCollection {
    fn store(&self) -> Metadata {
        self.store_all()
    }

    fn retrieve(&mut self, source: &Metadata) -> Result<()> {
        self.retrieve_all(source)
    }
}
