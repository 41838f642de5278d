//! Dedicated worker for deferred retrieve dispatch.
//!
//! Restoring many managers can take a while; deferring the dispatch phase
//! onto one dedicated thread keeps the initiating (UI) thread from blocking
//! or re-entering itself. A single worker, not a pool: ordering across
//! managers is strictly preserved.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::core::{Key, Metadata};
use crate::state::serializer::{dispatch, DispatchJob, LoadOutcome};
use crate::util::{Error, Result};

enum WorkerCommand {
    Dispatch {
        jobs: Vec<DispatchJob>,
        skipped: Vec<Key<Metadata>>,
    },
    Stop,
}

/// Handle to the dispatch worker thread.
pub struct DispatchWorker {
    tx: Sender<WorkerCommand>,
    rx: Receiver<LoadOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl DispatchWorker {
    /// Spawn the worker thread.
    pub fn spawn() -> Self {
        let (cmd_tx, cmd_rx) = channel::<WorkerCommand>();
        let (out_tx, out_rx) = channel::<LoadOutcome>();

        let handle = thread::spawn(move || {
            worker_loop(cmd_rx, out_tx);
        });

        Self {
            tx: cmd_tx,
            rx: out_rx,
            handle: Some(handle),
        }
    }

    /// Queue one load's dispatch phase. Errors if the worker was stopped;
    /// a silently dropped dispatch would look like a load that never fails.
    pub(crate) fn submit(&self, jobs: Vec<DispatchJob>, skipped: Vec<Key<Metadata>>) -> Result<()> {
        self.tx
            .send(WorkerCommand::Dispatch { jobs, skipped })
            .map_err(|_| Error::other("dispatch worker is stopped"))
    }

    /// Check for a finished outcome (non-blocking).
    pub fn try_recv(&self) -> Option<LoadOutcome> {
        self.rx.try_recv().ok()
    }

    /// Block until the next outcome arrives.
    pub fn wait(&self) -> Option<LoadOutcome> {
        self.rx.recv().ok()
    }

    /// Stop the worker and wait for it to finish.
    pub fn stop(&mut self) {
        let _ = self.tx.send(WorkerCommand::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DispatchWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(rx: Receiver<WorkerCommand>, tx: Sender<LoadOutcome>) {
    loop {
        let cmd = match rx.recv() {
            Ok(cmd) => cmd,
            Err(_) => break, // Channel closed
        };

        match cmd {
            WorkerCommand::Dispatch { jobs, skipped } => {
                let outcome = dispatch(jobs, skipped);
                let _ = tx.send(outcome);
            }
            WorkerCommand::Stop => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Key, Metadata, Version};
    use crate::registry::{shared, MetadataManager};
    use crate::util::Result;

    struct Probe {
        seen: Option<i32>,
    }

    impl MetadataManager for Probe {
        fn store(&self) -> Metadata {
            let mut b = Metadata::builder(Version::of(1, 0));
            b.put(&Key::of("seen"), self.seen);
            b.build()
        }

        fn retrieve(&mut self, source: &Metadata) -> Result<()> {
            self.seen = source.get_as(&Key::of("seen"))?;
            Ok(())
        }
    }

    #[test]
    fn test_worker_dispatches_and_reports() {
        let worker = DispatchWorker::spawn();
        let probe = shared(Probe { seen: None });

        let mut b = Metadata::builder(Version::of(1, 0));
        b.put(&Key::of("seen"), Some(42));
        let jobs = vec![DispatchJob {
            key: Key::of("probe"),
            manager: std::sync::Arc::clone(&probe),
            snapshot: b.build(),
        }];

        worker.submit(jobs, vec![]).unwrap();
        let outcome = worker.wait().expect("worker outcome");
        assert!(outcome.is_clean());
        assert_eq!(outcome.applied.len(), 1);

        let snapshot = probe.lock().store();
        assert_eq!(
            snapshot.get_as::<Option<i32>>(&Key::of("seen")).unwrap(),
            Some(42)
        );
    }

    #[test]
    fn test_worker_stop_is_idempotent() {
        let mut worker = DispatchWorker::spawn();
        worker.stop();
        worker.stop();
    }

    #[test]
    fn test_submit_after_stop_errors() {
        let mut worker = DispatchWorker::spawn();
        worker.stop();
        assert!(worker.submit(vec![], vec![]).is_err());
    }
}
