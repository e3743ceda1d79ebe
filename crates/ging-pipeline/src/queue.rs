//! Single-worker background indexing.
//!
//! Submissions go through a bounded channel to one worker task, so index
//! writes never overlap. Backpressure is explicit: a submission that cannot
//! be queued right away is rejected, never awaited.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ging_core::traits::FetchTransport;
use ging_core::Error as IndexError;
use ging_text::DocIndex;

use crate::pass::{index_package, BatchReport};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("indexing queue is full, {0} rejected")]
    Full(String),
    #[error("{0} is already queued or being indexed")]
    Duplicate(String),
    #[error("indexing queue is shut down")]
    Closed,
}

type Pending = Arc<Mutex<HashSet<String>>>;

pub struct IndexQueue {
    tx: Option<mpsc::Sender<String>>,
    pending: Pending,
    worker: Option<JoinHandle<BatchReport>>,
}

impl IndexQueue {
    /// Spawns the worker on the current tokio runtime.
    pub fn start(transport: Arc<dyn FetchTransport>, index: Arc<DocIndex>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let pending: Pending = Arc::default();
        let worker = tokio::spawn(run(rx, transport, index, Arc::clone(&pending)));
        Self { tx: Some(tx), pending, worker: Some(worker) }
    }

    /// Queues `import_path` for indexing.
    pub fn submit(&self, import_path: impl Into<String>) -> Result<(), SubmitError> {
        let path = import_path.into();
        let tx = self.tx.as_ref().ok_or(SubmitError::Closed)?;
        let mut pending = self.pending.lock().map_err(|_| SubmitError::Closed)?;
        if !pending.insert(path.clone()) {
            warn!(%path, "rejected duplicate submission");
            return Err(SubmitError::Duplicate(path));
        }
        match tx.try_send(path) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(path)) => {
                pending.remove(&path);
                warn!(%path, "rejected submission, queue full");
                Err(SubmitError::Full(path))
            }
            Err(TrySendError::Closed(path)) => {
                pending.remove(&path);
                Err(SubmitError::Closed)
            }
        }
    }

    /// Targets queued or in flight.
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Stops accepting work, lets the worker finish everything already
    /// queued and returns what it did. Later calls return an empty report.
    pub async fn shutdown(&mut self) -> BatchReport {
        self.tx.take();
        let Some(worker) = self.worker.take() else {
            return BatchReport::default();
        };
        match worker.await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "indexing worker died");
                BatchReport::default()
            }
        }
    }
}

async fn run(
    mut rx: mpsc::Receiver<String>,
    transport: Arc<dyn FetchTransport>,
    index: Arc<DocIndex>,
    pending: Pending,
) -> BatchReport {
    let mut report = BatchReport::default();
    while let Some(path) = rx.recv().await {
        debug!(%path, "indexing pass started");
        let (transport, index, target) = (Arc::clone(&transport), Arc::clone(&index), path.clone());
        match tokio::task::spawn_blocking(move || index_package(transport.as_ref(), &index, &target)).await {
            Ok(outcome) => report.record(&path, &outcome),
            Err(e) => report.record_error(&path, &IndexError::index_write(&path, format!("indexing task panicked: {e}"))),
        }
        if let Ok(mut pending) = pending.lock() {
            pending.remove(&path);
        }
    }
    report
}
