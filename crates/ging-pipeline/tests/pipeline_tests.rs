use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ging_core::traits::FetchTransport;
use ging_core::types::SourceTree;
use ging_core::{Error, ErrorKind, Result};
use ging_pipeline::{index_all, index_package, IndexQueue, SubmitError};
use ging_text::{search, DocIndex};

struct MemoryTransport {
    trees: HashMap<String, SourceTree>,
}

impl MemoryTransport {
    fn new(trees: impl IntoIterator<Item = SourceTree>) -> Self {
        Self { trees: trees.into_iter().map(|t| (t.import_path.clone(), t)).collect() }
    }
}

impl FetchTransport for MemoryTransport {
    fn get(&self, import_path: &str) -> Result<SourceTree> {
        self.trees.get(import_path).cloned().ok_or_else(|| Error::fetch(import_path, "404 Not Found"))
    }
}

fn package(path: &str, name: &str) -> SourceTree {
    let src = format!(
        "// Package {name} implements a small example.\npackage {name}\n\n// Run runs it.\nfunc Run() {{}}\n\n// Levels.\nconst (\n\tLow, High = 1, 2\n)\n"
    );
    SourceTree::new(path).with_file(format!("{name}.go"), src)
}

fn index() -> DocIndex {
    DocIndex::create_in_ram(50_000_000).expect("index")
}

#[test]
fn one_pass_writes_package_and_children() {
    let transport = MemoryTransport::new([package("example.com/alpha", "alpha")]);
    let index = index();
    let doc = index_package(&transport, &index, "example.com/alpha").expect("pass");
    assert_eq!(doc.documents().count(), 4);
    let page = search(&index, "implements", 10, "http://godoc.org").expect("search");
    assert_eq!(page.results[0].name, "alpha");
}

#[test]
fn batch_continues_past_failures() {
    let broken = SourceTree::new("example.com/broken").with_file("b.go", "package broken\n\nfunc {\n");
    let transport = MemoryTransport::new([package("example.com/alpha", "alpha"), broken, package("example.com/beta", "beta")]);
    let index = index();
    let mut seen = Vec::new();
    let report = index_all(
        &transport,
        &index,
        ["example.com/alpha", "example.com/missing", "example.com/broken", "example.com/beta"],
        |path, _| seen.push(path.to_string()),
    );
    assert_eq!(seen.len(), 4);
    let indexed: Vec<_> = report.indexed.iter().map(|i| (i.path.as_str(), i.documents)).collect();
    assert_eq!(indexed, vec![("example.com/alpha", 4), ("example.com/beta", 4)]);
    let failed: Vec<_> = report.failed.iter().map(|f| (f.path.as_str(), f.kind, f.retryable)).collect();
    assert_eq!(failed, vec![("example.com/missing", ErrorKind::Fetch, true), ("example.com/broken", ErrorKind::Parse, false)]);
    assert_eq!(report.to_string(), "2 indexed, 2 failed");
    assert_eq!(search(&index, "implements", 10, "http://godoc.org").expect("search").total_hits, 2);
}

/// Holds every fetch until the test lets it through.
struct GatedTransport {
    inner: MemoryTransport,
    started: Mutex<Sender<String>>,
    release: Mutex<Receiver<()>>,
}

impl FetchTransport for GatedTransport {
    fn get(&self, import_path: &str) -> Result<SourceTree> {
        self.started.lock().expect("started").send(import_path.to_string()).expect("test alive");
        self.release.lock().expect("release").recv().expect("released");
        self.inner.get(import_path)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queue_rejects_instead_of_waiting() {
    let (started_tx, started_rx) = channel();
    let (release_tx, release_rx) = channel();
    let transport = GatedTransport {
        inner: MemoryTransport::new([package("example.com/alpha", "alpha"), package("example.com/beta", "beta")]),
        started: Mutex::new(started_tx),
        release: Mutex::new(release_rx),
    };
    let index = Arc::new(index());
    let mut queue = IndexQueue::start(Arc::new(transport), Arc::clone(&index), 1);

    queue.submit("example.com/alpha").expect("first");
    let in_flight = started_rx.recv_timeout(Duration::from_secs(10)).expect("worker picked it up");
    assert_eq!(in_flight, "example.com/alpha");

    assert_eq!(queue.submit("example.com/alpha"), Err(SubmitError::Duplicate("example.com/alpha".into())));
    queue.submit("example.com/beta").expect("fills the queue");
    assert_eq!(queue.submit("example.com/gamma"), Err(SubmitError::Full("example.com/gamma".into())));
    assert_eq!(queue.submit("example.com/beta"), Err(SubmitError::Duplicate("example.com/beta".into())));
    assert_eq!(queue.pending(), 2);

    release_tx.send(()).expect("release alpha");
    release_tx.send(()).expect("release beta");
    let report = queue.shutdown().await;
    let indexed: Vec<_> = report.indexed.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(indexed, vec!["example.com/alpha", "example.com/beta"]);
    assert!(report.is_success());
    assert_eq!(queue.submit("example.com/delta"), Err(SubmitError::Closed));
    assert_eq!(queue.pending(), 0);
    assert_eq!(search(&index, "implements", 10, "http://godoc.org").expect("search").total_hits, 2);
}
