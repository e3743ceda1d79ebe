//! ging-pipeline
//!
//! One indexing pass (fetch, resolve, build, write), the batch driver that
//! keeps going past failed targets, and the single-worker indexing queue.
pub mod pass;
pub mod queue;
pub mod targets;

pub use pass::{index_all, index_package, BatchReport, Failure, Indexed};
pub use queue::{IndexQueue, SubmitError};
pub use targets::{parse_fetch_file, read_fetch_file};
