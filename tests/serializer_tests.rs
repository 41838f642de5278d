//! Integration tests for the serializer: ordering, isolation, aggregation.

use shapestate::prelude::*;

use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::tempdir;

/// Manager that records retrieve dispatch order into a shared log.
struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    value: i64,
}

impl Recorder {
    fn shared(
        name: &'static str,
        value: i64,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> SharedManager {
        shared(Recorder {
            name,
            log: Arc::clone(log),
            value,
        })
    }
}

impl MetadataManager for Recorder {
    fn store(&self) -> Metadata {
        let mut b = Metadata::builder(Version::of(1, 0));
        b.put(&Key::of("value"), self.value);
        b.build()
    }

    fn retrieve(&mut self, source: &Metadata) -> Result<()> {
        self.value = source.get_as(&Key::of("value"))?;
        self.log.lock().push(self.name);
        Ok(())
    }
}

/// Manager whose retrieve always fails.
struct Broken;

impl MetadataManager for Broken {
    fn store(&self) -> Metadata {
        Metadata::builder(Version::of(1, 0)).build()
    }

    fn retrieve(&mut self, source: &Metadata) -> Result<()> {
        // Demands a key it never stores.
        source.get(&Key::<i32>::of("nonexistent"))?;
        Ok(())
    }
}

#[test]
fn test_dispatch_order_follows_registration_not_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("state.json");
    let log = Arc::new(Mutex::new(Vec::new()));

    // Write the file with reversed registration order, so the physical
    // element order is C, B, A.
    let mut writer = Serializer::new();
    writer.register(Key::of("c"), Recorder::shared("c", 3, &log)).unwrap();
    writer.register(Key::of("b"), Recorder::shared("b", 2, &log)).unwrap();
    writer.register(Key::of("a"), Recorder::shared("a", 1, &log)).unwrap();
    writer.save(&path).unwrap();

    let mut reader = Serializer::new();
    reader.register(Key::of("a"), Recorder::shared("a", 0, &log)).unwrap();
    reader.register(Key::of("b"), Recorder::shared("b", 0, &log)).unwrap();
    reader.register(Key::of("c"), Recorder::shared("c", 0, &log)).unwrap();
    let outcome = reader.load(&path).unwrap();

    assert!(outcome.is_clean());
    assert_eq!(*log.lock(), ["a", "b", "c"]);
    let applied: Vec<&str> = outcome.applied.iter().map(|k| k.id()).collect();
    assert_eq!(applied, ["a", "b", "c"]);
}

#[test]
fn test_failure_is_isolated() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("state.json");
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut writer = Serializer::new();
    writer.register(Key::of("first"), Recorder::shared("first", 1, &log)).unwrap();
    writer.register(Key::of("broken"), shared(Broken)).unwrap();
    writer.register(Key::of("last"), Recorder::shared("last", 9, &log)).unwrap();
    writer.save(&path).unwrap();

    let restored = Recorder::shared("last", 0, &log);
    let mut reader = Serializer::new();
    reader.register(Key::of("first"), Recorder::shared("first", 0, &log)).unwrap();
    reader.register(Key::of("broken"), shared(Broken)).unwrap();
    reader.register(Key::of("last"), Arc::clone(&restored)).unwrap();

    let outcome = reader.load(&path).unwrap();

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].key.id(), "broken");
    assert!(matches!(outcome.failures[0].error, Error::KeyNotFound(_)));

    // The manager after the failing one still restored.
    assert_eq!(*log.lock(), ["first", "last"]);
    let snapshot = restored.lock().store();
    assert_eq!(snapshot.get_as::<i64>(&Key::of("value")).unwrap(), 9);
}

#[test]
fn test_manager_added_after_save_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("state.json");
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut writer = Serializer::new();
    writer.register(Key::of("old"), Recorder::shared("old", 1, &log)).unwrap();
    writer.save(&path).unwrap();

    let mut reader = Serializer::new();
    reader.register(Key::of("old"), Recorder::shared("old", 0, &log)).unwrap();
    reader.register(Key::of("new"), Recorder::shared("new", 0, &log)).unwrap();
    let outcome = reader.load(&path).unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].id(), "new");
    assert_eq!(*log.lock(), ["old"]);
}

#[test]
fn test_store_save_load_retrieve_scenario() {
    // Serializer s1 registers manager A under "view"; its snapshot X lands
    // in the file; serializer s2 registers manager B under the same key and
    // B.retrieve receives content equal to X.
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("state.json");
    let log = Arc::new(Mutex::new(Vec::new()));

    let a = Recorder::shared("a", 77, &log);
    let snapshot_x = a.lock().store();

    let mut s1 = Serializer::new();
    s1.register(Key::of("view"), a).unwrap();
    s1.save(&path).unwrap();

    let b = Recorder::shared("b", 0, &log);
    let mut s2 = Serializer::new();
    s2.register(Key::of("view"), Arc::clone(&b)).unwrap();
    let outcome = s2.load(&path).unwrap();

    assert!(outcome.is_clean());
    assert_eq!(b.lock().store(), snapshot_x);
}

#[test]
fn test_background_load_preserves_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("state.json");
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut writer = Serializer::new();
    writer.register(Key::of("a"), Recorder::shared("a", 1, &log)).unwrap();
    writer.register(Key::of("b"), Recorder::shared("b", 2, &log)).unwrap();
    writer.save(&path).unwrap();

    let mut reader = Serializer::new();
    reader.register(Key::of("a"), Recorder::shared("a", 0, &log)).unwrap();
    reader.register(Key::of("b"), Recorder::shared("b", 0, &log)).unwrap();

    let worker = DispatchWorker::spawn();
    reader.load_in_background(&path, &worker).unwrap();
    let outcome = worker.wait().expect("worker outcome");

    assert!(outcome.is_clean());
    assert_eq!(*log.lock(), ["a", "b"]);
}

#[test]
fn test_background_load_on_stopped_worker_errors() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("state.json");
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut writer = Serializer::new();
    writer.register(Key::of("a"), Recorder::shared("a", 1, &log)).unwrap();
    writer.save(&path).unwrap();

    let mut reader = Serializer::new();
    reader.register(Key::of("a"), Recorder::shared("a", 0, &log)).unwrap();

    let mut worker = DispatchWorker::spawn();
    worker.stop();
    // The dispatch cannot run; the caller must hear about it.
    assert!(reader.load_in_background(&path, &worker).is_err());
    assert!(log.lock().is_empty());
}

#[test]
fn test_nested_collection_as_manager() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("state.json");
    let log = Arc::new(Mutex::new(Vec::new()));

    // Group two panels under one serializer key.
    let mut panels = ManagerCollection::new();
    panels.add(Key::of("panel.color"), Recorder::shared("color", 4, &log)).unwrap();
    panels.add(Key::of("panel.grid"), Recorder::shared("grid", 5, &log)).unwrap();

    let mut writer = Serializer::new();
    writer.register(Key::of("panels"), shared(panels)).unwrap();
    writer.save(&path).unwrap();

    let grid = Recorder::shared("grid", 0, &log);
    let mut panels2 = ManagerCollection::new();
    panels2.add(Key::of("panel.color"), Recorder::shared("color", 0, &log)).unwrap();
    panels2.add(Key::of("panel.grid"), Arc::clone(&grid)).unwrap();

    let mut reader = Serializer::new();
    reader.register(Key::of("panels"), shared(panels2)).unwrap();
    let outcome = reader.load(&path).unwrap();

    assert!(outcome.is_clean());
    let snapshot = grid.lock().store();
    assert_eq!(snapshot.get_as::<i64>(&Key::of("value")).unwrap(), 5);
}
