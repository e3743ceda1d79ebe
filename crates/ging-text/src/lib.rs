//! ging-text
//!
//! Tantivy-backed documentation index: schema and analyzers, the on-disk
//! index handle, and phrase search with highlighted results.
pub mod tantivy_utils;
pub mod schema;
pub mod index;
pub mod search;

pub use index::DocIndex;
pub use schema::SCHEMA_VERSION;
pub use search::search;
