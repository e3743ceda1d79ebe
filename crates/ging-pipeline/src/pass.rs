use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use ging_core::traits::FetchTransport;
use ging_core::types::PackageDocument;
use ging_core::{Error, ErrorKind, Result};
use ging_text::DocIndex;

/// Fetches, resolves and builds `import_path`, then replaces its block in
/// `index`. Nothing is written unless every earlier step succeeded.
pub fn index_package(transport: &dyn FetchTransport, index: &DocIndex, import_path: &str) -> Result<PackageDocument> {
    let tree = ging_source::resolve(transport, import_path)?;
    let doc = ging_source::build(&tree);
    index.index_document(doc.import_path(), &doc)?;
    info!(
        import_path,
        env = %tree.env,
        funcs = doc.funcs().len(),
        consts = doc.consts().len(),
        vars = doc.vars().len(),
        "indexed package"
    );
    Ok(doc)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Indexed {
    pub path: String,
    pub documents: usize,
}

/// A target that did not make it into the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: String,
    #[serde(serialize_with = "kind_label")]
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

fn kind_label<S: serde::Serializer>(kind: &ErrorKind, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(kind)
}

/// Outcome of a batch, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub indexed: Vec<Indexed>,
    pub failed: Vec<Failure>,
}

impl BatchReport {
    pub fn record(&mut self, path: &str, outcome: &Result<PackageDocument>) {
        match outcome {
            Ok(doc) => self.indexed.push(Indexed { path: path.to_string(), documents: doc.documents().count() }),
            Err(e) => self.record_error(path, e),
        }
    }

    pub fn record_error(&mut self, path: &str, error: &Error) {
        warn!(path, kind = %error.kind(), error = %error, "indexing failed");
        self.failed.push(Failure {
            path: path.to_string(),
            kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        });
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} indexed, {} failed", self.indexed.len(), self.failed.len())
    }
}

/// Indexes every target in order. A failed target is recorded and the
/// batch moves on. `progress` sees each target once its pass is over.
pub fn index_all<I, S, P>(transport: &dyn FetchTransport, index: &DocIndex, paths: I, mut progress: P) -> BatchReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    P: FnMut(&str, &Result<PackageDocument>),
{
    let mut report = BatchReport::default();
    for path in paths {
        let path = path.as_ref();
        let outcome = index_package(transport, index, path);
        progress(path, &outcome);
        report.record(path, &outcome);
    }
    info!(%report, "batch finished");
    report
}
