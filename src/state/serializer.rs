//! Whole-file persistence across registered managers.
//!
//! A [`Serializer`] owns an ordered registry of managers. `save` snapshots
//! every manager and writes one fully rendered JSON document; `load` parses
//! the whole file first and only then dispatches `retrieve` calls, in
//! registration order, isolating any single manager's failure from the rest.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::{Key, Metadata, Value};
use crate::registry::{ManagerCollection, SharedManager};
use crate::util::{Error, Result};
use crate::wire::{decode, encode};

/// One pending `retrieve` call.
pub(crate) struct DispatchJob {
    pub(crate) key: Key<Metadata>,
    pub(crate) manager: SharedManager,
    pub(crate) snapshot: Metadata,
}

/// A manager whose `retrieve` failed during a load.
#[derive(Debug)]
pub struct LoadFailure {
    pub key: Key<Metadata>,
    pub error: Error,
}

/// Report of one load: which managers were restored, which had no entry in
/// the file, and which failed. Failures are isolated, never fatal to the
/// load as a whole.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub applied: Vec<Key<Metadata>>,
    pub skipped: Vec<Key<Metadata>>,
    pub failures: Vec<LoadFailure>,
}

impl LoadOutcome {
    /// True when every dispatched manager restored successfully.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Orchestrates one file's worth of metadata across registered managers.
#[derive(Default)]
pub struct Serializer {
    managers: ManagerCollection,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manager under a key.
    ///
    /// Registration order controls both write order and retrieve dispatch
    /// order; some managers depend on others having been restored first.
    /// Registering an already-bound key fails fast.
    pub fn register(&mut self, key: Key<Metadata>, manager: SharedManager) -> Result<()> {
        self.managers.add(key, manager)
    }

    /// Remove a registration; fails if the key was never registered.
    pub fn deregister(&mut self, key: &Key<Metadata>) -> Result<()> {
        self.managers.remove(key).map(|_| ())
    }

    pub fn is_registered(&self, key: &Key<Metadata>) -> bool {
        self.managers.contains(key)
    }

    /// Snapshot every registered manager and write the state file.
    ///
    /// The document is rendered completely before any byte is flushed, so a
    /// failing manager or encoder never leaves a truncated file behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut entries = Vec::with_capacity(self.managers.len());
        for (key, manager) in self.managers.iter() {
            let snapshot = manager.lock().store();
            debug!(key = key.id(), entries = snapshot.len(), "storing manager");
            entries.push(encode::element(
                &key.as_untyped(),
                &Value::Metadata(snapshot),
            )?);
        }
        let text = serde_json::to_string_pretty(&serde_json::Value::Array(entries))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Load a state file and dispatch `retrieve` on every registered manager
    /// in registration order.
    ///
    /// The whole file is parsed before the first `retrieve` fires. Managers
    /// without an entry in the file are skipped silently; a failing manager
    /// is recorded in the outcome and the remaining managers still run. I/O
    /// and top-level parse problems are errors.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let (jobs, skipped) = self.plan(read_state_file(path)?);
        Ok(dispatch(jobs, skipped))
    }

    /// Like [`Serializer::load`], but hands the dispatch phase to the given
    /// worker so the calling thread is not blocked or re-entered. Parsing
    /// still happens here; the outcome arrives through the worker's channel.
    pub fn load_in_background(
        &self,
        path: impl AsRef<Path>,
        worker: &super::DispatchWorker,
    ) -> Result<()> {
        let (jobs, skipped) = self.plan(read_state_file(path)?);
        worker.submit(jobs, skipped)
    }

    /// Pair loaded entries with registered managers, in registration order.
    fn plan(
        &self,
        entries: Vec<(Key<Metadata>, Metadata)>,
    ) -> (Vec<DispatchJob>, Vec<Key<Metadata>>) {
        let mut jobs = Vec::new();
        let mut skipped = Vec::new();
        for (key, manager) in self.managers.iter() {
            match entries.iter().find(|(k, _)| k == key) {
                Some((_, snapshot)) => jobs.push(DispatchJob {
                    key: key.clone(),
                    manager: SharedManager::clone(manager),
                    snapshot: snapshot.clone(),
                }),
                None => {
                    debug!(key = key.id(), "no entry in state file; skipping");
                    skipped.push(key.clone());
                }
            }
        }
        (jobs, skipped)
    }
}

/// Run pending retrieve calls in order, isolating failures.
pub(crate) fn dispatch(jobs: Vec<DispatchJob>, skipped: Vec<Key<Metadata>>) -> LoadOutcome {
    let mut outcome = LoadOutcome {
        skipped,
        ..LoadOutcome::default()
    };
    for job in jobs {
        match job.manager.lock().retrieve(&job.snapshot) {
            Ok(()) => outcome.applied.push(job.key),
            Err(error) => {
                warn!(key = job.key.id(), %error, "manager failed to retrieve");
                outcome.failures.push(LoadFailure {
                    key: job.key,
                    error,
                });
            }
        }
    }
    outcome
}

/// Parse a state file into its (key, metadata) entries, preserving the
/// physical order in the file.
pub fn read_state_file(path: impl AsRef<Path>) -> Result<Vec<(Key<Metadata>, Metadata)>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    let array = json
        .as_array()
        .ok_or_else(|| Error::invalid("state file must hold a top-level array"))?;

    let mut out = Vec::with_capacity(array.len());
    for entry in array {
        let (key, value) = decode::element_from_json(entry)?;
        match value {
            Value::Metadata(md) => out.push((key.retyped(), md)),
            other => {
                return Err(Error::mismatch("metadata", other.kind_name()));
            }
        }
    }
    Ok(out)
}

/// Write a single metadata document to a file.
pub fn save_metadata(path: impl AsRef<Path>, metadata: &Metadata) -> Result<()> {
    let json = encode::metadata_tagged(metadata.view())?;
    let text = serde_json::to_string_pretty(&json)?;
    fs::write(path, text)?;
    Ok(())
}

/// Read a single metadata document from a file.
///
/// Every failure - missing file, malformed JSON, structural decode problems -
/// is reported as an error; this path never substitutes an empty document.
pub fn load_metadata(path: impl AsRef<Path>) -> Result<Metadata> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    decode::metadata_from_tagged(&json)
}
